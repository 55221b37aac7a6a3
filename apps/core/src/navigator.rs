use std::fmt::{Display, Formatter};

use crate::model::{EntityType, ResultEntry};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub route: String,
}

impl Display for Destination {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.route)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    #[error("no route for entity type of result '{id}'")]
    UnknownEntityType { id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnresolvedPolicy {
    Panic,
    Ignore,
}

impl Default for UnresolvedPolicy {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Panic
        } else {
            Self::Ignore
        }
    }
}

pub trait Router: Send {
    fn navigate(&mut self, destination: &Destination);
}

pub fn route_base(entity: EntityType) -> Option<&'static str> {
    match entity {
        EntityType::Course => Some("/courses"),
        EntityType::Teacher => Some("/teachers"),
        EntityType::Room => Some("/rooms"),
        EntityType::Schedule => Some("/schedules"),
        EntityType::Student => Some("/students"),
        EntityType::Department => Some("/departments"),
        EntityType::Unknown => None,
    }
}

pub fn resolve(entry: &ResultEntry) -> Result<Destination, NavigationError> {
    let base = route_base(entry.entity_type).ok_or_else(|| NavigationError::UnknownEntityType {
        id: entry.id.clone(),
    })?;

    let mut route = format!("{base}/{}", encode_component(&entry.id, false));
    if let Some(code) = entry.metadata.code.as_deref().filter(|code| !code.is_empty()) {
        route.push_str("?code=");
        route.push_str(&encode_component(code, true));
    }
    Ok(Destination { route })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SelectionNavigator {
    policy: UnresolvedPolicy,
}

impl SelectionNavigator {
    pub fn new(policy: UnresolvedPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> UnresolvedPolicy {
        self.policy
    }

    pub fn destination_for(&self, entry: &ResultEntry) -> Option<Destination> {
        match resolve(entry) {
            Ok(destination) => Some(destination),
            Err(error) => {
                tracing::error!(error = %error, "selected result cannot be navigated");
                match self.policy {
                    UnresolvedPolicy::Panic => panic!("{error}"),
                    UnresolvedPolicy::Ignore => None,
                }
            }
        }
    }
}

fn encode_component(input: &str, plus_for_space: bool) -> String {
    let mut out = String::new();
    for byte in input.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            out.push(byte as char);
        } else if byte == b' ' && plus_for_space {
            out.push('+');
        } else {
            out.push('%');
            out.push_str(&format!("{byte:02X}"));
        }
    }
    out
}
