//! Key-value storage capability. The shell owns the actual store (keychain,
//! preferences file); the core only names keys and moves bytes.

use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_KEY_LENGTH: usize = 512;
pub const MAX_VALUE_SIZE: usize = 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum KvOperation {
    Get { key: String },
    Set { key: String, value: Vec<u8> },
    Delete { key: String },
}

impl KvOperation {
    pub fn key(&self) -> &str {
        match self {
            Self::Get { key } | Self::Set { key, .. } | Self::Delete { key } => key,
        }
    }

    fn validate(&self) -> Result<(), KvError> {
        let key = self.key();
        if key.trim().is_empty() {
            return Err(KvError::InvalidKey {
                key: key.to_string(),
                reason: "key cannot be empty".to_string(),
            });
        }
        if key.len() > MAX_KEY_LENGTH {
            return Err(KvError::InvalidKey {
                key: key.chars().take(50).collect::<String>() + "...",
                reason: format!("key exceeds maximum length of {MAX_KEY_LENGTH} bytes"),
            });
        }
        if key.chars().any(char::is_control) {
            return Err(KvError::InvalidKey {
                key: key.escape_default().to_string(),
                reason: "key contains control characters".to_string(),
            });
        }
        if let Self::Set { value, .. } = self {
            if value.len() > MAX_VALUE_SIZE {
                return Err(KvError::ValueTooLarge {
                    size: value.len(),
                    max: MAX_VALUE_SIZE,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum KvOutput {
    Value(Option<Vec<u8>>),
    Written,
    Deleted { existed: bool },
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum KvError {
    #[error("invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("value too large: {size} bytes exceeds maximum of {max} bytes")]
    ValueTooLarge { size: usize, max: usize },

    #[error("storage error: {message}")]
    Storage { message: String },

    #[error("unexpected output for {operation}")]
    UnexpectedOutput { operation: String },
}

pub type KvResult = Result<KvOutput, KvError>;

impl Operation for KvOperation {
    type Output = KvResult;
}

pub struct KeyValue<Ev> {
    context: CapabilityContext<KvOperation, Ev>,
}

impl<Ev> Capability<Ev> for KeyValue<Ev> {
    type Operation = KvOperation;
    type MappedSelf<MappedEv> = KeyValue<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        KeyValue::new(self.context.map_event(f))
    }
}

impl<Ev> KeyValue<Ev> {
    pub fn new(context: CapabilityContext<KvOperation, Ev>) -> Self {
        Self { context }
    }
}

impl<Ev> KeyValue<Ev>
where
    Ev: 'static,
{
    pub fn get<F>(&self, key: impl Into<String>, make_event: F)
    where
        F: FnOnce(Result<Option<Vec<u8>>, KvError>) -> Ev + Send + 'static,
    {
        self.run(KvOperation::Get { key: key.into() }, move |output| {
            make_event(output.and_then(|output| match output {
                KvOutput::Value(value) => Ok(value),
                _ => Err(KvError::UnexpectedOutput {
                    operation: "get".into(),
                }),
            }))
        });
    }

    pub fn set<F>(&self, key: impl Into<String>, value: Vec<u8>, make_event: F)
    where
        F: FnOnce(Result<(), KvError>) -> Ev + Send + 'static,
    {
        let op = KvOperation::Set {
            key: key.into(),
            value,
        };
        self.run(op, move |output| {
            make_event(output.and_then(|output| match output {
                KvOutput::Written => Ok(()),
                _ => Err(KvError::UnexpectedOutput {
                    operation: "set".into(),
                }),
            }))
        });
    }

    /// Deleting a missing key is not an error.
    pub fn delete<F>(&self, key: impl Into<String>, make_event: F)
    where
        F: FnOnce(Result<(), KvError>) -> Ev + Send + 'static,
    {
        self.run(KvOperation::Delete { key: key.into() }, move |output| {
            make_event(output.and_then(|output| match output {
                KvOutput::Deleted { .. } => Ok(()),
                _ => Err(KvError::UnexpectedOutput {
                    operation: "delete".into(),
                }),
            }))
        });
    }

    fn run<F>(&self, op: KvOperation, make_event: F)
    where
        F: FnOnce(KvResult) -> Ev + Send + 'static,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let result = match op.validate() {
                Ok(()) => ctx.request_from_shell(op).await,
                Err(e) => Err(e),
            };
            ctx.update_app(make_event(result));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_key_is_rejected() {
        let op = KvOperation::Get { key: "  ".into() };
        assert!(matches!(op.validate(), Err(KvError::InvalidKey { .. })));
    }

    #[test]
    fn control_characters_are_rejected() {
        let op = KvOperation::Delete {
            key: "acc\0ount".into(),
        };
        assert!(matches!(op.validate(), Err(KvError::InvalidKey { .. })));
    }

    #[test]
    fn oversized_value_is_rejected() {
        let op = KvOperation::Set {
            key: "account".into(),
            value: vec![0; MAX_VALUE_SIZE + 1],
        };
        assert_eq!(
            op.validate(),
            Err(KvError::ValueTooLarge {
                size: MAX_VALUE_SIZE + 1,
                max: MAX_VALUE_SIZE
            })
        );
    }

    #[test]
    fn account_key_is_valid() {
        let op = KvOperation::Set {
            key: "account".into(),
            value: b"{}".to_vec(),
        };
        assert_eq!(op.validate(), Ok(()));
        assert_eq!(op.key(), "account");
    }
}
