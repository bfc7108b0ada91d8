//! Body encoders for the non-JSON routes: url-encoded forms and
//! `multipart/form-data`.

use url::form_urlencoded;
use uuid::Uuid;

use crate::types::{Attachment, CustomerUpload};

/// Encode `pairs` as `application/x-www-form-urlencoded`, in order.
pub fn urlencoded(pairs: &[(&str, &str)]) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Text { name: String, value: String },
    File { name: String, file: Attachment },
}

/// A `multipart/form-data` body under construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartForm {
    boundary: String,
    parts: Vec<Part>,
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::with_boundary(format!("campaign-form-{}", Uuid::new_v4().simple()))
    }

    /// Fixed boundary, for deterministic output.
    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            parts: Vec::new(),
        }
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(Part::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn file(mut self, name: impl Into<String>, file: Attachment) -> Self {
        self.parts.push(Part::File {
            name: name.into(),
            file,
        });
        self
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Names of the parts, in order.
    pub fn field_names(&self) -> Vec<&str> {
        self.parts
            .iter()
            .map(|p| match p {
                Part::Text { name, .. } | Part::File { name, .. } => name.as_str(),
            })
            .collect()
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for part in &self.parts {
            out.extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
            match part {
                Part::Text { name, value } => {
                    out.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                            quote(name)
                        )
                        .as_bytes(),
                    );
                    out.extend_from_slice(value.as_bytes());
                }
                Part::File { name, file } => {
                    out.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                            quote(name),
                            quote(&file.filename)
                        )
                        .as_bytes(),
                    );
                    out.extend_from_slice(
                        format!("Content-Type: {}\r\n\r\n", file.content_type).as_bytes(),
                    );
                    out.extend_from_slice(&file.bytes);
                }
            }
            out.extend_from_slice(b"\r\n");
        }
        out.extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        out
    }
}

// Browsers percent-escape these inside quoted disposition parameters.
fn quote(s: &str) -> String {
    s.replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

impl From<&CustomerUpload> for MultipartForm {
    fn from(upload: &CustomerUpload) -> Self {
        MultipartForm::new()
            .text("name", upload.name.as_str())
            .text("campaign_id", upload.campaign_id.to_string())
            .text("company_id", upload.company_id.to_string())
            .text("agents", upload.agents.join(","))
            .file("csv_file", upload.csv_file.clone())
    }
}
