use std::error::Error;
use std::fmt::{Display, Formatter};

pub type NuSpecResult<T> = Result<T, NuSpecError>;
pub type CodecResult<T> = NuSpecResult<T>;
pub type ComputeResult<T> = NuSpecResult<T>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NuSpecErrorCategory {
    IoError,
    FormatError,
    DimensionError,
    ConfigError,
    InvalidFlavorError,
    InternalError,
}

impl NuSpecErrorCategory {
    pub const fn exit_mapping(self) -> ExitMapping {
        match self {
            Self::FormatError => ExitMapping {
                exit_code: 2,
                rust_category: "FormatError",
            },
            Self::IoError => ExitMapping {
                exit_code: 3,
                rust_category: "IoError",
            },
            Self::DimensionError => ExitMapping {
                exit_code: 4,
                rust_category: "DimensionError",
            },
            Self::ConfigError => ExitMapping {
                exit_code: 5,
                rust_category: "ConfigError",
            },
            Self::InvalidFlavorError => ExitMapping {
                exit_code: 6,
                rust_category: "InvalidFlavorError",
            },
            Self::InternalError => ExitMapping {
                exit_code: 7,
                rust_category: "InternalError",
            },
        }
    }

    pub const fn exit_code(self) -> i32 {
        self.exit_mapping().exit_code
    }

    pub const fn rust_category(self) -> &'static str {
        self.exit_mapping().rust_category
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitMapping {
    pub exit_code: i32,
    pub rust_category: &'static str,
}

/// Error shared by every core operation: a category, a stable dotted
/// placeholder code (`IO.FLAT_TABLE_READ`, `DIM.RESPONSE_MATRIX`, ...) and a
/// human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NuSpecError {
    category: NuSpecErrorCategory,
    placeholder: &'static str,
    message: String,
}

impl NuSpecError {
    pub fn new(
        category: NuSpecErrorCategory,
        placeholder: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            placeholder,
            message: message.into(),
        }
    }

    pub fn io(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(NuSpecErrorCategory::IoError, placeholder, message)
    }

    pub fn format(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(NuSpecErrorCategory::FormatError, placeholder, message)
    }

    pub fn dimension(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(NuSpecErrorCategory::DimensionError, placeholder, message)
    }

    pub fn config(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(NuSpecErrorCategory::ConfigError, placeholder, message)
    }

    pub fn invalid_flavor(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(NuSpecErrorCategory::InvalidFlavorError, placeholder, message)
    }

    pub fn internal(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(NuSpecErrorCategory::InternalError, placeholder, message)
    }

    pub const fn category(&self) -> NuSpecErrorCategory {
        self.category
    }

    pub const fn placeholder(&self) -> &'static str {
        self.placeholder
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        format!("ERROR: [{}] {}", self.placeholder, self.message)
    }

    pub fn fatal_exit_line(&self) -> String {
        format!("FATAL EXIT CODE: {}", self.exit_code())
    }
}

impl Display for NuSpecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.category.rust_category(),
            self.placeholder,
            self.message
        )
    }
}

impl Error for NuSpecError {}
