use fake::Dummy;
use serde::{Deserialize, Serialize};

/// Defines owner data structure.
///
#[derive(Clone, Debug, Default, Dummy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Defines a successful sign-in response.
///
#[derive(Clone, Debug, Dummy, PartialEq, Eq, Deserialize)]
pub struct SignInResponse {
    pub token: String,
    #[serde(default)]
    pub owner: Owner,
    #[serde(rename = "isLibraryCreated", default)]
    pub is_library_created: bool,
}

/// Defines a successful sign-up response.
///
#[derive(Clone, Debug, Dummy, PartialEq, Eq, Deserialize)]
pub struct SignUpResponse {
    pub token: String,
    #[serde(default)]
    pub owner: Owner,
    #[serde(default)]
    pub message: String,
    #[serde(rename = "isLibraryCreated", default)]
    pub is_library_created: bool,
}

/// Defines library data structure.
///
#[derive(Clone, Debug, Dummy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Library {
    #[serde(default)]
    pub id: Option<u64>,
    pub name: String,
    pub seats: u32,
    pub address: String,
}
