use serde::{Deserialize, Serialize};

use crate::error::FsmError;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FsmOptions {
    /// Number of states to reserve room for up front.
    pub state_capacity: usize,
    /// Hard limit on the number of states; `add_state` fails once it is reached.
    pub max_states: Option<usize>,
}

impl FsmOptions {
    pub fn from_json(json: &str) -> Result<Self, FsmError> {
        Ok(serde_json::from_str(json)?)
    }
}
