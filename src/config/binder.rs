//! Declarative binding of environment variables onto typed structs.
//!
//! # Responsibilities
//! - Describe, per target type, which fields bind to which variables
//! - Parse per-field tags (`key=NAME;required=true`) into [`BindingSpec`]s
//! - Coerce raw strings into field types and assign them
//!
//! # Design Decisions
//! - No runtime reflection: each type exposes an explicit table of
//!   [`FieldBinding`]s, usually generated with [`env_bindings!`]
//! - Field types are checked at compile time through [`EnvField`]
//! - Every tag is validated before any field is assigned
//! - The first missing required variable or type mismatch aborts binding
//!   before any field is assigned; absent optional variables leave the
//!   field untouched
//!
//! # Example
//! ```
//! use burrow::config::{EnvBinder, EnvSource};
//!
//! #[derive(Default)]
//! struct Database {
//!     url: String,
//!     pool_size: u32,
//!     debug: bool,
//! }
//!
//! burrow::env_bindings!(Database {
//!     url: String => "key=DATABASE_URL;required=true",
//!     pool_size: u32 => "key=DATABASE_POOL",
//!     debug: bool => "key=DATABASE_DEBUG",
//! });
//!
//! let source = EnvSource::from_pairs([("DATABASE_URL", "postgres://db"), ("DATABASE_POOL", "8")]);
//! let db: Database = EnvBinder::new(source).load().unwrap();
//! assert_eq!(db.url, "postgres://db");
//! assert_eq!(db.pool_size, 8);
//! assert!(!db.debug);
//! ```

use std::fmt;
use std::path::Path;

use thiserror::Error;

use crate::config::{EnvError, EnvSource};

/// Errors raised while binding a struct from an [`EnvSource`].
#[derive(Debug, Error)]
pub enum BindError {
    #[error("missing required variable {key} (field `{field}`)")]
    MissingRequired { key: String, field: &'static str },

    #[error("variable {key}={value:?} is not a valid {expected}")]
    TypeMismatch {
        key: String,
        value: String,
        expected: FieldKind,
    },

    #[error("invalid binding tag on field `{field}`: {reason}")]
    InvalidTag { field: &'static str, reason: String },

    #[error("type `{target}` declares no bound fields")]
    NoBindings { target: &'static str },

    #[error(transparent)]
    Source(#[from] EnvError),
}

/// The value kinds a field can be bound as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Integer,
    Boolean,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldKind::String => "string",
            FieldKind::Integer => "integer",
            FieldKind::Boolean => "boolean",
        })
    }
}

/// A type that can be parsed from a single environment value.
pub trait EnvField: Sized {
    const KIND: FieldKind;

    /// Parse `raw`, returning `None` when it is not a valid value.
    fn parse_env(raw: &str) -> Option<Self>;
}

impl EnvField for String {
    const KIND: FieldKind = FieldKind::String;

    fn parse_env(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }
}

impl EnvField for bool {
    const KIND: FieldKind = FieldKind::Boolean;

    fn parse_env(raw: &str) -> Option<Self> {
        parse_bool(raw)
    }
}

macro_rules! integer_fields {
    ($($ty:ty),*) => {
        $(
            impl EnvField for $ty {
                const KIND: FieldKind = FieldKind::Integer;

                fn parse_env(raw: &str) -> Option<Self> {
                    raw.trim().parse().ok()
                }
            }
        )*
    };
}

integer_fields!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl<T: EnvField> EnvField for Option<T> {
    const KIND: FieldKind = T::KIND;

    fn parse_env(raw: &str) -> Option<Self> {
        T::parse_env(raw).map(Some)
    }
}

/// Parse a boolean from the fixed token set
/// `1 t T TRUE true True` / `0 f F FALSE false False`.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim() {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Parsed binding metadata for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingSpec {
    pub field: &'static str,
    pub key: String,
    pub required: bool,
    pub kind: FieldKind,
}

impl BindingSpec {
    /// Parse a tag of `;`-separated `name=value` pairs.
    ///
    /// Recognized names are `key` (mandatory) and `required` (boolean,
    /// default false). A blank tag means the field is not bound.
    pub fn parse(field: &'static str, tag: &str, kind: FieldKind) -> Result<Option<Self>, BindError> {
        if tag.trim().is_empty() {
            return Ok(None);
        }

        let invalid = |reason: String| BindError::InvalidTag { field, reason };
        let mut key: Option<String> = None;
        let mut required: Option<bool> = None;

        for part in tag.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let (name, value) = part
                .split_once('=')
                .ok_or_else(|| invalid(format!("expected name=value, got `{part}`")))?;
            let (name, value) = (name.trim(), value.trim());

            match name {
                "key" if key.is_some() => return Err(invalid("`key` given twice".into())),
                "key" if value.is_empty() => return Err(invalid("`key` is empty".into())),
                "key" => key = Some(value.to_string()),
                "required" if required.is_some() => {
                    return Err(invalid("`required` given twice".into()))
                }
                "required" => {
                    let flag = parse_bool(value)
                        .ok_or_else(|| invalid(format!("`required={value}` is not a boolean")))?;
                    required = Some(flag);
                }
                other => return Err(invalid(format!("unknown attribute `{other}`"))),
            }
        }

        let key = key.ok_or_else(|| invalid("missing `key`".into()))?;
        Ok(Some(Self {
            field,
            key,
            required: required.unwrap_or(false),
            kind,
        }))
    }
}

type Setter<T> = Box<dyn FnOnce(&mut T)>;
type Stage<T> = Box<dyn Fn(&str) -> Option<Setter<T>> + Send + Sync>;

/// One row of a type's binding table: field name, tag and typed setter.
pub struct FieldBinding<T> {
    field: &'static str,
    tag: &'static str,
    kind: FieldKind,
    stage: Stage<T>,
}

impl<T: 'static> FieldBinding<T> {
    /// Describe a field of type `F` bound by `tag`.
    pub fn new<F: EnvField + 'static>(field: &'static str, tag: &'static str, set: fn(&mut T, F)) -> Self {
        Self {
            field,
            tag,
            kind: F::KIND,
            stage: Box::new(move |raw: &str| {
                let value = F::parse_env(raw)?;
                Some(Box::new(move |target: &mut T| set(target, value)) as Setter<T>)
            }),
        }
    }
}

impl<T> FieldBinding<T> {
    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn tag(&self) -> &'static str {
        self.tag
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }
}

impl<T> fmt::Debug for FieldBinding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldBinding")
            .field("field", &self.field)
            .field("tag", &self.tag)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Types that can be populated from an [`EnvSource`].
///
/// Implement with [`env_bindings!`](crate::env_bindings) rather than by hand.
pub trait EnvBind: Sized + 'static {
    /// The binding table for this type.
    fn bindings() -> Vec<FieldBinding<Self>>;
}

/// Derive and validate the binding specs of `T`.
///
/// Fails on any malformed tag, or when no field carries a tag.
pub fn binding_specs<T: EnvBind>() -> Result<Vec<BindingSpec>, BindError> {
    let mut specs = Vec::new();
    for binding in T::bindings() {
        if let Some(spec) = BindingSpec::parse(binding.field, binding.tag, binding.kind)? {
            specs.push(spec);
        }
    }

    if specs.is_empty() {
        return Err(BindError::NoBindings {
            target: std::any::type_name::<T>(),
        });
    }
    Ok(specs)
}

/// Binds structs from a fixed [`EnvSource`].
#[derive(Debug, Clone, Default)]
pub struct EnvBinder {
    source: EnvSource,
}

impl EnvBinder {
    pub fn new(source: EnvSource) -> Self {
        Self { source }
    }

    /// Build a binder over `env_file` (optional) plus the process
    /// environment, the latter taking precedence.
    pub fn from_env(env_file: Option<&Path>) -> Result<Self, BindError> {
        Ok(Self::new(EnvSource::load(env_file)?))
    }

    pub fn source(&self) -> &EnvSource {
        &self.source
    }

    /// Populate the bound fields of `target`.
    ///
    /// Tags are validated first, then every present value is parsed. The
    /// first fatal error is returned and `target` is left untouched; fields
    /// are only assigned once all of them parsed.
    pub fn bind<T: EnvBind>(&self, target: &mut T) -> Result<(), BindError> {
        let bindings = T::bindings();
        let mut plan = Vec::with_capacity(bindings.len());
        for binding in &bindings {
            if let Some(spec) = BindingSpec::parse(binding.field, binding.tag, binding.kind)? {
                plan.push((spec, binding));
            }
        }

        if plan.is_empty() {
            return Err(BindError::NoBindings {
                target: std::any::type_name::<T>(),
            });
        }

        let mut setters = Vec::with_capacity(plan.len());
        for (spec, binding) in plan {
            let Some(raw) = self.source.get(&spec.key) else {
                if spec.required {
                    return Err(BindError::MissingRequired {
                        key: spec.key,
                        field: spec.field,
                    });
                }
                continue;
            };

            let setter = (binding.stage)(raw).ok_or_else(|| BindError::TypeMismatch {
                key: spec.key.clone(),
                value: raw.to_string(),
                expected: spec.kind,
            })?;
            tracing::trace!(field = spec.field, key = %spec.key, "Field bound from environment");
            setters.push(setter);
        }

        for set in setters {
            set(&mut *target);
        }
        Ok(())
    }

    /// Create a default `T` and bind it.
    pub fn load<T: EnvBind + Default>(&self) -> Result<T, BindError> {
        let mut target = T::default();
        self.bind(&mut target)?;
        Ok(target)
    }
}

/// Bind `target` from `env_file` (optional) and the process environment.
pub fn bind<T: EnvBind>(target: &mut T, env_file: Option<&Path>) -> Result<(), BindError> {
    EnvBinder::from_env(env_file)?.bind(target)
}

/// Generate an [`EnvBind`] implementation from a field table.
///
/// ```
/// #[derive(Default)]
/// struct App {
///     port: u16,
///     name: Option<String>,
///     internal: Vec<u8>, // not listed, never bound
/// }
///
/// burrow::env_bindings!(App {
///     port: u16 => "key=PORT;required=true",
///     name: Option<String> => "key=APP_NAME",
/// });
/// ```
#[macro_export]
macro_rules! env_bindings {
    ($target:ident { $($field:ident : $fty:ty => $tag:literal),* $(,)? }) => {
        impl $crate::config::EnvBind for $target {
            fn bindings() -> ::std::vec::Vec<$crate::config::FieldBinding<Self>> {
                ::std::vec![
                    $(
                        $crate::config::FieldBinding::new(
                            ::core::stringify!($field),
                            $tag,
                            |target: &mut $target, value: $fty| target.$field = value,
                        )
                    ),*
                ]
            }
        }
    };
}
