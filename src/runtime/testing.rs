//! Scripted runtimes for unit tests
//!
//! Every host call is appended to a shared log so tests can assert the exact
//! order of calls, including cleanup.

use std::cell::RefCell;
use std::rc::Rc;

use super::isolate::IsolateRuntime;
use super::jvm::{JniSession, JvmLauncher, JvmOptions};

pub type CallLog = Rc<RefCell<Vec<String>>>;

pub fn new_log() -> CallLog {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn entries(log: &CallLog) -> Vec<String> {
    log.borrow().clone()
}

pub struct FakeIsolate {
    pub log: CallLog,
    pub entry: String,
    pub create_status: i32,
    pub tear_down_status: i32,
}

impl FakeIsolate {
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: Rc::clone(log),
            entry: "noop".to_string(),
            create_status: 0,
            tear_down_status: 0,
        }
    }

    pub fn failing(
        log: &CallLog,
        status: i32,
    ) -> Self {
        Self {
            create_status: status,
            ..Self::new(log)
        }
    }
}

impl IsolateRuntime for FakeIsolate {
    type Thread = u32;

    fn entry_name(&self) -> &str {
        &self.entry
    }

    fn create_isolate(&self) -> Result<u32, i32> {
        self.log.borrow_mut().push("graal_create_isolate".to_string());
        match self.create_status {
            0 => Ok(7),
            status => Err(status),
        }
    }

    fn call_entry(
        &self,
        thread: &u32,
    ) {
        self.log
            .borrow_mut()
            .push(format!("{}({})", self.entry, thread));
    }

    fn tear_down(
        &self,
        thread: u32,
    ) -> i32 {
        self.log
            .borrow_mut()
            .push(format!("graal_tear_down_isolate({})", thread));
        self.tear_down_status
    }
}

/// Step of the JNI sequence a [`FakeJvm`] fails at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JniStep {
    Create,
    FindClass,
    Constructor,
    NewObject,
    Method,
    Call,
}

pub struct FakeJvm {
    pub log: CallLog,
    pub fail_at: Option<JniStep>,
    pub create_status: i32,
    pub pending_after_create: bool,
    pub destroy_status: i32,
}

impl FakeJvm {
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: Rc::clone(log),
            fail_at: None,
            create_status: -1,
            pending_after_create: false,
            destroy_status: 0,
        }
    }

    pub fn failing_at(
        log: &CallLog,
        step: JniStep,
    ) -> Self {
        Self {
            fail_at: Some(step),
            ..Self::new(log)
        }
    }
}

impl JvmLauncher for FakeJvm {
    type Session = FakeSession;

    fn create(
        &self,
        options: &JvmOptions,
    ) -> Result<FakeSession, i32> {
        self.log
            .borrow_mut()
            .push(format!("JNI_CreateJavaVM {:?}", options.option_strings()));
        if self.fail_at == Some(JniStep::Create) {
            return Err(self.create_status);
        }
        Ok(FakeSession {
            log: Rc::clone(&self.log),
            fail_at: self.fail_at,
            pending: self.pending_after_create,
            next_ref: 1,
            destroy_status: self.destroy_status,
        })
    }
}

pub struct FakeSession {
    log: CallLog,
    fail_at: Option<JniStep>,
    pending: bool,
    next_ref: u32,
    destroy_status: i32,
}

impl FakeSession {
    fn push(
        &self,
        entry: String,
    ) {
        self.log.borrow_mut().push(entry);
    }

    /// Whether `step` fails; a failing step leaves an exception pending
    fn fails(
        &mut self,
        step: JniStep,
    ) -> bool {
        if self.fail_at == Some(step) {
            self.pending = true;
            return true;
        }
        false
    }

    fn local_ref(
        &mut self,
        step: JniStep,
    ) -> Option<u32> {
        if self.fails(step) {
            return None;
        }
        let id = self.next_ref;
        self.next_ref += 1;
        Some(id)
    }
}

impl JniSession for FakeSession {
    type LocalRef = u32;
    type Method = u32;

    fn exception_check(&mut self) -> bool {
        self.pending
    }

    fn exception_describe(&mut self) {
        self.push("ExceptionDescribe".to_string());
    }

    fn exception_clear(&mut self) {
        self.push("ExceptionClear".to_string());
        self.pending = false;
    }

    fn find_class(
        &mut self,
        internal_name: &str,
    ) -> Option<u32> {
        self.push(format!("FindClass {}", internal_name));
        self.local_ref(JniStep::FindClass)
    }

    fn method_id(
        &mut self,
        _class: &u32,
        name: &str,
        signature: &str,
    ) -> Option<u32> {
        self.push(format!("GetMethodID {}{}", name, signature));
        let step = if name == "<init>" {
            JniStep::Constructor
        } else {
            JniStep::Method
        };
        (!self.fails(step)).then_some(100)
    }

    fn new_object(
        &mut self,
        class: &u32,
        constructor: u32,
    ) -> Option<u32> {
        self.push(format!("NewObjectA {} {}", class, constructor));
        self.local_ref(JniStep::NewObject)
    }

    fn call_void_method(
        &mut self,
        object: &u32,
        method: u32,
    ) {
        self.push(format!("CallVoidMethodA {} {}", object, method));
        self.fails(JniStep::Call);
    }

    fn delete_local_ref(
        &mut self,
        local: u32,
    ) {
        self.push(format!("DeleteLocalRef {}", local));
    }

    fn destroy(self) -> Result<(), i32> {
        self.push("DestroyJavaVM".to_string());
        match self.destroy_status {
            0 => Ok(()),
            status => Err(status),
        }
    }
}
