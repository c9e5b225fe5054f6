#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use voxnote_core::{
    DevicePermission, InMemoryKeyValueStore, KeyValueStore, PermissionAnswer, PermissionGate,
    PermissionState, RecognitionConfig, RecognitionEngine, RecognitionError, RecognitionErrorKind,
    SpeechCapability, StorageError, StorageResult,
};

#[derive(Debug, Default)]
pub struct EngineLog {
    pub created: usize,
    pub starts: usize,
    pub stops: usize,
    pub last_config: Option<RecognitionConfig>,
}

pub struct MockEngine {
    log: Rc<RefCell<EngineLog>>,
    fail_start: bool,
}

impl RecognitionEngine for MockEngine {
    fn start(&mut self, config: &RecognitionConfig) -> Result<(), RecognitionError> {
        let mut log = self.log.borrow_mut();
        log.starts += 1;
        log.last_config = Some(config.clone());
        if self.fail_start {
            return Err(RecognitionError::new(
                RecognitionErrorKind::AudioCapture,
                "no input device",
            ));
        }
        Ok(())
    }

    fn stop(&mut self) {
        self.log.borrow_mut().stops += 1;
    }
}

pub struct MockSpeech {
    pub supported: bool,
    pub fail_start: bool,
    pub log: Rc<RefCell<EngineLog>>,
}

impl MockSpeech {
    pub fn supported() -> Self {
        Self {
            supported: true,
            fail_start: false,
            log: Rc::default(),
        }
    }

    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::supported()
        }
    }

    pub fn failing_start() -> Self {
        Self {
            fail_start: true,
            ..Self::supported()
        }
    }
}

impl SpeechCapability for MockSpeech {
    type Engine = MockEngine;

    fn is_supported(&self) -> bool {
        self.supported
    }

    fn create_engine(&mut self) -> Result<MockEngine, RecognitionError> {
        self.log.borrow_mut().created += 1;
        Ok(MockEngine {
            log: Rc::clone(&self.log),
            fail_start: self.fail_start,
        })
    }
}

pub struct ScriptedPermissions {
    pub query_answer: PermissionAnswer,
    pub request_answer: PermissionAnswer,
    pub queries: usize,
    pub requests: usize,
}

impl ScriptedPermissions {
    pub fn new(query_answer: PermissionAnswer, request_answer: PermissionAnswer) -> Self {
        Self {
            query_answer,
            request_answer,
            queries: 0,
            requests: 0,
        }
    }

    pub fn granted() -> Self {
        Self::new(
            PermissionAnswer::Ready(PermissionState::Granted),
            PermissionAnswer::Ready(PermissionState::Granted),
        )
    }

    pub fn denied() -> Self {
        Self::new(
            PermissionAnswer::Ready(PermissionState::Denied),
            PermissionAnswer::Ready(PermissionState::Denied),
        )
    }

    pub fn pending() -> Self {
        Self::new(PermissionAnswer::Pending, PermissionAnswer::Pending)
    }
}

impl PermissionGate for ScriptedPermissions {
    fn query(&mut self, permission: DevicePermission) -> PermissionAnswer {
        assert_eq!(permission, DevicePermission::Microphone);
        self.queries += 1;
        self.query_answer.clone()
    }

    fn request(&mut self, permission: DevicePermission) -> PermissionAnswer {
        assert_eq!(permission, DevicePermission::Microphone);
        self.requests += 1;
        self.request_answer.clone()
    }
}

/// Key-value store whose reads and writes can be switched to fail with a
/// SQLite I/O error. The switches are shared so a test can flip them after
/// the store has been moved into a `NoteStore`.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: InMemoryKeyValueStore,
    pub fail_reads: Rc<Cell<bool>>,
    pub fail_writes: Rc<Cell<bool>>,
}

pub fn disk_io_error() -> StorageError {
    rusqlite::Error::SqliteFailure(
        rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_IOERR),
        Some("disk I/O error".to_string()),
    )
    .into()
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        if self.fail_reads.get() {
            return Err(disk_io_error());
        }
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        if self.fail_writes.get() {
            return Err(disk_io_error());
        }
        self.inner.set(key, value)
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        if self.fail_writes.get() {
            return Err(disk_io_error());
        }
        self.inner.remove(key)
    }
}
