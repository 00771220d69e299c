use async_trait::async_trait;
use serde_json::Value;
use shared::{Error, Result};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::client::RpcCaller;

/// Scripted caller: answers each method with a canned result or remote error
#[derive(Default)]
pub struct ScriptedRpc {
    answers: HashMap<String, std::result::Result<Value, String>>,
    calls: Mutex<Vec<(String, Vec<Value>)>>,
}

impl ScriptedRpc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, method: &str, result: Value) -> Self {
        self.answers.insert(method.to_string(), Ok(result));
        self
    }

    pub fn fail(mut self, method: &str, message: &str) -> Self {
        self.answers.insert(method.to_string(), Err(message.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<(String, Vec<Value>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RpcCaller for ScriptedRpc {
    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value> {
        self.calls
            .lock()
            .unwrap()
            .push((method.to_string(), params));

        match self.answers.get(method) {
            Some(Ok(value)) => Ok(value.clone()),
            Some(Err(message)) => Err(Error::Remote {
                code: Some(-32000),
                message: message.clone(),
            }),
            None => Err(Error::Transport(format!("No scripted answer for {}", method))),
        }
    }

    fn endpoint(&self) -> &str {
        "scripted"
    }
}
