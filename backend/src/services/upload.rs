//! Shared multipart collection.
//!
//! File parts are streamed into unnamed-lifetime temp files so a multi-MB
//! DOCX never sits in the multipart buffer; the temp files are removed when
//! the form is dropped, on success and on every error path alike. Text
//! parts are small and collected into strings.

use crate::error::{Result, ServiceError};
use actix_multipart::Multipart;
use futures_util::StreamExt;
use std::collections::HashMap;
use std::io::{Read, Seek, SeekFrom, Write};
use tempfile::NamedTempFile;

pub struct UploadedFile {
    pub filename: String,
    temp: NamedTempFile,
}

impl UploadedFile {
    pub fn bytes(&mut self) -> Result<Vec<u8>> {
        let file = self.temp.as_file_mut();
        file.seek(SeekFrom::Start(0))?;
        let mut buf = Vec::new();
        file.read_to_end(&mut buf)?;
        Ok(buf)
    }
}

#[derive(Default)]
pub struct UploadForm {
    files: HashMap<String, UploadedFile>,
    values: HashMap<String, String>,
}

impl UploadForm {
    pub async fn collect(mut payload: Multipart) -> Result<Self> {
        let mut form = UploadForm::default();

        while let Some(item) = payload.next().await {
            let mut field = item.map_err(bad_payload)?;
            let Some(name) = field
                .content_disposition()
                .and_then(|cd| cd.get_name().map(str::to_string))
            else {
                continue;
            };
            let filename = field
                .content_disposition()
                .and_then(|cd| cd.get_filename().map(str::to_string));

            match filename {
                Some(filename) => {
                    let mut temp = NamedTempFile::new()?;
                    while let Some(chunk) = field.next().await {
                        temp.write_all(&chunk.map_err(bad_payload)?)?;
                    }
                    form.files.insert(name, UploadedFile { filename, temp });
                }
                None => {
                    let mut buf = Vec::new();
                    while let Some(chunk) = field.next().await {
                        buf.extend_from_slice(&chunk.map_err(bad_payload)?);
                    }
                    form.values
                        .insert(name, String::from_utf8_lossy(&buf).into_owned());
                }
            }
        }
        Ok(form)
    }

    pub fn file_mut(&mut self, name: &str) -> Option<&mut UploadedFile> {
        self.files.get_mut(name)
    }

    /// Bytes of a file part that must be present.
    pub fn require_file_bytes(&mut self, name: &str) -> Result<Vec<u8>> {
        self.file_mut(name)
            .ok_or_else(|| ServiceError::Validation(format!("missing '{}' file part", name)))?
            .bytes()
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Boolean text part; absent means false.
    pub fn flag(&self, name: &str) -> bool {
        matches!(
            self.value(name).map(str::trim),
            Some("true") | Some("1") | Some("on") | Some("yes")
        )
    }
}

fn bad_payload(e: actix_multipart::MultipartError) -> ServiceError {
    ServiceError::Validation(format!("bad multipart payload: {}", e))
}
