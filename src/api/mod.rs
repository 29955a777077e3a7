//! Library service API.
//!
//! Provides the three calls the session flow depends on (sign-in, sign-up
//! and library creation), each returning an explicitly-typed response.

mod client;
mod error;
mod resource;

pub use error::ApiError;
pub use resource::*;

use client::Client;
use log::*;
use serde_json::json;
use std::time::Duration;

pub const SIGN_IN_PATH: &str = "/owners/login";
pub const SIGN_UP_PATH: &str = "/owners/signup";
pub const CREATE_LIBRARY_PATH: &str = "/libraries";

pub const SIGN_IN_FAILED: &str = "Sign in failed. Please try again.";
pub const SIGN_UP_FAILED: &str = "Signup failed. Please try again.";
pub const CREATE_LIBRARY_FAILED: &str = "Library creation failed. Please try again.";

/// Responsible for asynchronous interaction with the library service
/// including transformation of response data into explicitly-defined types.
///
pub struct LibraryApi {
    client: Client,
}

impl LibraryApi {
    /// Returns a new instance for the given service root.
    ///
    pub fn new(base_url: &str, timeout: Duration) -> Result<LibraryApi, ApiError> {
        debug!("Initializing library API client for {}...", base_url);
        Ok(LibraryApi {
            client: Client::new(base_url, timeout)?,
        })
    }

    /// Exchange credentials for a session token.
    ///
    pub async fn sign_in(&self, identifier: &str, password: &str) -> Result<SignInResponse, ApiError> {
        debug!("Requesting sign in for {}...", identifier);
        let response: SignInResponse = self
            .client
            .post(
                SIGN_IN_PATH,
                &json!({ "identifier": identifier, "password": password }),
                None,
            )
            .await?;
        require_token(&response.token)?;
        Ok(response)
    }

    /// Register a new owner and return their session token.
    ///
    pub async fn sign_up(
        &self,
        name: &str,
        identifier: &str,
        password: &str,
    ) -> Result<SignUpResponse, ApiError> {
        debug!("Requesting sign up for {}...", identifier);
        let response: SignUpResponse = self
            .client
            .post(
                SIGN_UP_PATH,
                &json!({ "name": name, "identifier": identifier, "password": password }),
                None,
            )
            .await?;
        require_token(&response.token)?;
        Ok(response)
    }

    /// Create the owner's library. The service's reply is searched for the
    /// created library; when it carries none, the submitted details are
    /// returned instead.
    ///
    pub async fn create_library(
        &self,
        token: &str,
        name: &str,
        seats: u32,
        address: &str,
    ) -> Result<Library, ApiError> {
        debug!("Requesting creation of library '{}' with {} seats...", name, seats);
        let body: serde_json::Value = self
            .client
            .post(
                CREATE_LIBRARY_PATH,
                &json!({ "name": name, "seats": seats, "address": address }),
                Some(token),
            )
            .await?;

        let candidate = body
            .get("library")
            .or_else(|| body.get("data"))
            .unwrap_or(&body)
            .clone();
        match serde_json::from_value::<Library>(candidate) {
            Ok(library) => Ok(library),
            Err(e) => {
                debug!("Library response carried no library object ({}), using submitted details", e);
                Ok(Library {
                    id: None,
                    name: name.to_owned(),
                    seats,
                    address: address.to_owned(),
                })
            }
        }
    }
}

fn require_token(token: &str) -> Result<(), ApiError> {
    if token.trim().is_empty() {
        return Err(ApiError::InvalidResponse("response carried an empty token".to_string()));
    }
    Ok(())
}
