//! Shared fixtures for the mock Graph server.

#![allow(dead_code)]

pub mod flaky;
pub mod socket_guard;

use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TENANT: &str = "contoso.onmicrosoft.com";
pub const TOKEN_PATH: &str = "/contoso.onmicrosoft.com/oauth2/v2.0/token";
pub const SITE_ID: &str = "contoso.sharepoint.com,1111,2222";
pub const DRIVE_ID: &str = "b!drive";

/// Config JSON pointing both endpoints at `server`.
pub fn config_json(server: &MockServer, document_library: Option<&str>) -> Value {
    let mut config = json!({
        "tenant_name": TENANT,
        "client_id": "app-id",
        "client_secret": "app-secret",
        "grant_type": "client_credentials",
        "scope": "https://graph.microsoft.com/.default",
        "site_name": "Finance",
        "login_base_url": server.uri(),
        "graph_base_url": server.uri(),
    });
    if let Some(library) = document_library {
        config["document_library"] = json!(library);
    }
    config
}

/// Answers every token request with a fixed bearer token.
pub async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "Bearer",
            "expires_in": 3599,
            "access_token": "token-1"
        })))
        .mount(server)
        .await;
}

/// Mounts the site and drive lookups for site "Finance" and library "Documents".
pub async fn mount_site_and_drive(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/sites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [
                {"id": "other-site", "name": "Marketing"},
                {
                    "id": SITE_ID,
                    "name": "Finance",
                    "webUrl": "https://contoso.sharepoint.com/sites/Finance",
                    "siteCollection": {"hostname": "contoso.sharepoint.com"}
                }
            ]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/sites/{SITE_ID}/drives")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [
                {
                    "id": "b!other",
                    "name": "Site Assets",
                    "webUrl": "https://contoso.sharepoint.com/sites/Finance/SiteAssets"
                },
                {
                    "id": DRIVE_ID,
                    "name": "Documents",
                    "webUrl": "https://contoso.sharepoint.com/sites/Finance/Shared%20Documents"
                }
            ]
        })))
        .mount(server)
        .await;
}

/// Root children path for the test site and drive.
pub fn root_children_path() -> String {
    format!("/sites/{SITE_ID}/drives/{DRIVE_ID}/root/children")
}
