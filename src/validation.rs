use thiserror::Error;

use crate::models::{
    AssessmentSubmission, ChangePasswordForm, LoginRequest, NewComment, NewPost,
    RecoverPasswordRequest, RegisterForm, ResetPasswordForm, SendMessageRequest,
};

pub const MIN_PASSWORD_LEN: usize = 6;

/// ValidationError
///
/// Form problems caught before any request leaves the portal. Messages are shown
/// inline next to the form, so they are written for the end user.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    EmptyField(&'static str),

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Password must be at least {min} characters long")]
    PasswordTooShort { min: usize },

    #[error("Expected {expected} answers, got {got}")]
    AnswerCount { expected: usize, got: usize },

    #[error("Answer to question {question} must be between 0 and 3, got {value}")]
    AnswerOutOfRange { question: usize, value: u8 },
}

/// Validate
///
/// Implemented by every inbound form. Handlers call it first and bail out with a
/// 400 before touching the session or any collaborator.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

pub fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(())
}

/// Checks a new password and its confirmation. Mismatch is reported before length,
/// matching the order the forms show errors in.
pub fn new_password(password: &str, confirmation: &str) -> Result<(), ValidationError> {
    if password != confirmation {
        return Err(ValidationError::PasswordMismatch);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        require("email", &self.email)?;
        require("password", &self.password)
    }
}

impl Validate for RegisterForm {
    fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)?;
        require("email", &self.email)?;
        require("password", &self.password)?;
        new_password(&self.password, &self.confirm_password)
    }
}

impl Validate for RecoverPasswordRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        require("email", &self.email)
    }
}

impl Validate for ResetPasswordForm {
    fn validate(&self) -> Result<(), ValidationError> {
        require("token", &self.token)?;
        require("password", &self.password)?;
        new_password(&self.password, &self.confirm_password)
    }
}

impl Validate for ChangePasswordForm {
    fn validate(&self) -> Result<(), ValidationError> {
        require("current_password", &self.current_password)?;
        require("new_password", &self.new_password)?;
        new_password(&self.new_password, &self.confirm_password)
    }
}

impl Validate for NewPost {
    fn validate(&self) -> Result<(), ValidationError> {
        require("title", &self.title)?;
        require("content", &self.content)
    }
}

impl Validate for NewComment {
    fn validate(&self) -> Result<(), ValidationError> {
        require("content", &self.content)
    }
}

impl Validate for SendMessageRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        require("message", &self.message)
    }
}

impl Validate for AssessmentSubmission {
    fn validate(&self) -> Result<(), ValidationError> {
        crate::assessment::check_answers(&self.answers)
    }
}
