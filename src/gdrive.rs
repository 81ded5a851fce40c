use anyhow::Context;
use std::path::Path;
use tracing::{debug, info};

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3/files?uploadType=multipart&fields=id";
const BOUNDARY: &str = "songbird-upload-boundary";

pub(crate) mod response {
    use serde::{Deserialize, Serialize};

    /// `credentials.json` as downloaded for an installed (desktop) app.
    #[derive(Serialize, Deserialize, Clone, Debug)]
    pub(crate) struct Credentials {
        pub(crate) installed: ClientSecret,
    }

    #[derive(Serialize, Deserialize, Clone, Debug)]
    pub(crate) struct ClientSecret {
        pub(crate) client_id: String,
        pub(crate) client_secret: String,
        #[serde(default)]
        pub(crate) token_uri: Option<String>,
    }

    /// `token.json` written by a previous authorization.
    #[derive(Serialize, Deserialize, Clone, Debug)]
    pub(crate) struct AuthorizedUser {
        pub(crate) refresh_token: String,
        #[serde(default)]
        pub(crate) client_id: Option<String>,
        #[serde(default)]
        pub(crate) client_secret: Option<String>,
        #[serde(default)]
        pub(crate) token_uri: Option<String>,
    }

    #[derive(Serialize, Deserialize, Clone, Debug)]
    pub(crate) struct Token {
        pub(crate) access_token: String,
    }

    #[derive(Serialize, Deserialize, Clone, Debug)]
    pub(crate) struct File {
        pub(crate) id: String,
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, anyhow::Error> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("Could not read '{}'", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("'{}' is malformed", path.display()))
}

/// Client id, secret and token endpoint, preferring what the token file carries.
fn client_secret(credentials_path: &Path, user: &response::AuthorizedUser) -> Result<response::ClientSecret, anyhow::Error> {
    if let (Some(client_id), Some(client_secret)) = (&user.client_id, &user.client_secret) {
        return Ok(response::ClientSecret {
            client_id: client_id.clone(),
            client_secret: client_secret.clone(),
            token_uri: user.token_uri.clone(),
        });
    }
    let credentials: response::Credentials = read_json(credentials_path)?;
    Ok(credentials.installed)
}

fn audio_mime(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("mp3") => "audio/mpeg",
        Some("m4a") => "audio/mp4",
        Some("opus") | Some("ogg") => "audio/ogg",
        Some("flac") => "audio/flac",
        Some("wav") => "audio/wav",
        _ => "application/octet-stream",
    }
}

fn multipart_body(name: &str, folder_id: &str, mime: &str, content: &[u8]) -> Result<Vec<u8>, anyhow::Error> {
    let metadata = serde_json::json!({ "name": name, "parents": [folder_id] });

    let mut body = Vec::with_capacity(content.len() + 512);
    body.extend_from_slice(format!("--{BOUNDARY}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n").as_bytes());
    body.extend_from_slice(&serde_json::to_vec(&metadata)?);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}\r\nContent-Type: {mime}\r\n\r\n").as_bytes());
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    Ok(body)
}

/// Upload `song_path` as `song_name` into `folder_id`; returns the new file id.
///
/// Needs a `token.json` holding a refresh token. Authorizing from scratch is not supported.
pub(crate) async fn save_song(
    client: &reqwest::Client,
    folder_id: &str,
    credentials_path: &Path,
    token_path: &Path,
    song_name: &str,
    song_path: &Path,
) -> Result<String, anyhow::Error> {
    if !token_path.exists() {
        anyhow::bail!(
            "No '{}' found. Authorize songbird for Google Drive once and place the resulting token there",
            token_path.display()
        );
    }
    let user: response::AuthorizedUser = read_json(token_path)?;
    let secret = client_secret(credentials_path, &user)?;
    let token_uri = secret.token_uri.as_deref().unwrap_or(DEFAULT_TOKEN_URI);

    let token: response::Token = client
        .post(token_uri)
        .form(&[
            ("client_id", secret.client_id.as_str()),
            ("client_secret", secret.client_secret.as_str()),
            ("refresh_token", user.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ])
        .send()
        .await
        .context("Could not reach the Google token endpoint")?
        .error_for_status()
        .context("Google refused to refresh the drive token")?
        .json()
        .await?;
    debug!("Refreshed Google Drive access token");

    let content = tokio::fs::read(song_path)
        .await
        .with_context(|| format!("Could not read '{}'", song_path.display()))?;

    let file: response::File = client
        .post(UPLOAD_URL)
        .bearer_auth(&token.access_token)
        .header(reqwest::header::CONTENT_TYPE, format!("multipart/related; boundary={BOUNDARY}"))
        .body(multipart_body(song_name, folder_id, audio_mime(song_path), &content)?)
        .send()
        .await
        .context("Could not reach Google Drive")?
        .error_for_status()
        .context("Google Drive refused the upload")?
        .json()
        .await?;

    info!("File creation successful -- ID: {}", file.id);
    Ok(file.id)
}
