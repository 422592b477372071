use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Priority {
    P1,
    P2,
    P3,
}

impl Priority {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "P1" => Some(Priority::P1),
            "P2" => Some(Priority::P2),
            "P3" => Some(Priority::P3),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Priority::P1 => "P1",
            Priority::P2 => "P2",
            Priority::P3 => "P3",
        };
        f.write_str(label)
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Priority::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown priority '{}'", raw)))
    }
}

/// One generated QA test case, using the wire names the model is asked for.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TestCase {
    #[serde(rename = "testCaseId")]
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "testSteps")]
    pub steps: Vec<String>,
    #[serde(rename = "expectedResults")]
    pub expected_result: String,
    pub priority: Priority,
}
