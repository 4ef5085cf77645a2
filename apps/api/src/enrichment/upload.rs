//! Multipart form parsing. Uploaded files land in a per-request temp dir that
//! is removed when the form is dropped, whether the request succeeded or not.

use std::path::{Path, PathBuf};

use axum::extract::Multipart;
use tempfile::TempDir;
use tracing::{debug, info};

use crate::collection::SourceLocators;
use crate::errors::AppError;
use crate::sources::document::SUPPORTED_EXTENSIONS;

pub struct UploadForm {
    // Owns the uploaded files.
    dir: TempDir,
    pub resume: Option<PathBuf>,
    pub linkedin: Option<PathBuf>,
    pub github_profile: Option<String>,
    pub portfolio_link: Option<String>,
    pub other_link: Option<String>,
    pub job_description: Option<String>,
}

/// Lower-cased extension of an uploaded file name, if it is one we can read.
pub fn supported_extension(field: &str, file_name: &str) -> Result<String, AppError> {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    if SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        let allowed: Vec<String> = SUPPORTED_EXTENSIONS.iter().map(|e| format!(".{e}")).collect();
        Err(AppError::Validation(format!(
            "{field}: file type '.{ext}' not supported. Allowed types: {}",
            allowed.join(", ")
        )))
    }
}

pub fn validate_github_url(url: &str) -> Result<(), AppError> {
    if url.contains("github.com") {
        Ok(())
    } else {
        Err(AppError::Validation("Invalid GitHub URL".to_string()))
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl UploadForm {
    pub async fn read(multipart: &mut Multipart) -> Result<Self, AppError> {
        let dir = tempfile::tempdir()?;
        let mut form = UploadForm {
            resume: None,
            linkedin: None,
            github_profile: None,
            portfolio_link: None,
            other_link: None,
            job_description: None,
            dir,
        };

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "resume_file" | "linkedin_profile_file" | "linkedin_file" => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    // Browsers send an empty part for an untouched optional file input.
                    if file_name.is_empty() {
                        continue;
                    }
                    let ext = supported_extension(&name, &file_name)?;
                    let data = field.bytes().await?;
                    let stem = if name == "resume_file" { "resume" } else { "linkedin" };
                    let path = form.dir.path().join(format!("{stem}.{ext}"));
                    tokio::fs::write(&path, &data).await?;
                    info!(field = %name, bytes = data.len(), "Stored upload");

                    if name == "resume_file" {
                        form.resume = Some(path);
                    } else {
                        form.linkedin = Some(path);
                    }
                }
                "github_profile" => form.github_profile = non_blank(field.text().await?),
                "portfolio_link" => form.portfolio_link = non_blank(field.text().await?),
                "other_link" => form.other_link = non_blank(field.text().await?),
                "job_description" => form.job_description = non_blank(field.text().await?),
                other => debug!(field = other, "Ignoring unknown form field"),
            }
        }

        Ok(form)
    }

    pub fn resume_path(&self) -> Result<&Path, AppError> {
        self.resume
            .as_deref()
            .ok_or_else(|| AppError::Validation("resume_file is required".to_string()))
    }

    pub fn linkedin_path(&self) -> Result<&Path, AppError> {
        self.linkedin
            .as_deref()
            .ok_or_else(|| AppError::Validation("linkedin_file is required".to_string()))
    }

    pub fn job_description(&self) -> Result<String, AppError> {
        self.job_description
            .clone()
            .ok_or_else(|| AppError::Validation("Job description is required".to_string()))
    }

    pub fn locators(&self) -> Result<SourceLocators, AppError> {
        if let Some(url) = &self.github_profile {
            validate_github_url(url)?;
        }

        let path_string = |p: &PathBuf| p.to_string_lossy().into_owned();
        Ok(SourceLocators {
            resume: self.resume_path()?.to_string_lossy().into_owned(),
            linkedin: self.linkedin.as_ref().map(path_string),
            github: self.github_profile.clone(),
            portfolio: self.portfolio_link.clone(),
            other_link: self.other_link.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_extension_is_case_insensitive() {
        assert_eq!(supported_extension("resume_file", "CV.PDF").unwrap(), "pdf");
        assert_eq!(supported_extension("resume_file", "notes.md").unwrap(), "md");
        assert_eq!(supported_extension("resume_file", "cv.Docx").unwrap(), "docx");
    }

    #[test]
    fn test_unsupported_extension_lists_allowed_types() {
        let err = supported_extension("resume_file", "cv.doc").unwrap_err();
        let AppError::Validation(message) = err else {
            panic!("expected a validation error");
        };
        assert!(message.contains("'.doc'"));
        assert!(message.contains(".pdf, .docx, .txt, .md"));
    }

    #[test]
    fn test_github_url_must_point_at_github() {
        assert!(validate_github_url("https://github.com/ada").is_ok());
        assert!(validate_github_url("https://gitlab.com/ada").is_err());
    }

    #[test]
    fn test_non_blank_trims() {
        assert_eq!(non_blank("  https://ada.dev \n".to_string()), Some("https://ada.dev".to_string()));
        assert_eq!(non_blank("   ".to_string()), None);
    }
}
