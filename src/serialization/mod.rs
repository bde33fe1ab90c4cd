//! The surface the core exposes to a registered-type serialization layer:
//! the [Formats] registry, the [ExtractContext], the [Extractor] operation
//! shape and the problem-aggregation contract of
//! [ExtractionError](crate::ExtractionError).

use crate::error::{DuplicateTypeError, ExtractionError, Problem};
use crate::path::Path;
use crate::reader::Reader;
use once_cell::sync::Lazy;
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// What tree extraction does with a repeated object key.
pub enum DuplicateKeyAction {
    /// Keep the last occurrence.
    Replace,
    /// Keep the first occurrence.
    Ignore,
    /// Fail with a `duplicate_key` error.
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// What tree extraction does with an integer literal outside the `i64`
/// range.
pub enum IntegerOverflowAction {
    Fail,
    CoerceDecimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Whether extraction stops at the first problem or keeps collecting.
pub enum OnError {
    FailImmediately,
    CollectAll,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Options for tree extraction and typed extraction.
pub struct ExtractOptions {
    pub on_duplicate_key: DuplicateKeyAction,
    pub on_integer_overflow: IntegerOverflowAction,
    pub on_error: OnError,
    /// Upper bound on collected problems before extraction gives up.
    pub max_failures: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            on_duplicate_key: DuplicateKeyAction::Replace,
            on_integer_overflow: IntegerOverflowAction::Fail,
            on_error: OnError::FailImmediately,
            max_failures: 10,
        }
    }
}

impl ExtractOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_duplicate_key(mut self, action: DuplicateKeyAction) -> Self {
        self.on_duplicate_key = action;
        self
    }

    pub fn on_integer_overflow(mut self, action: IntegerOverflowAction) -> Self {
        self.on_integer_overflow = action;
        self
    }

    pub fn on_error(mut self, on_error: OnError) -> Self {
        self.on_error = on_error;
        self
    }

    pub fn max_failures(mut self, max_failures: usize) -> Self {
        self.max_failures = max_failures;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// A serialization format version carried by the [ExtractContext] for
/// extractors that vary their behavior over time.
pub struct Version {
    pub major: u32,
    pub minor: u32,
}

impl Version {
    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

/// Converts JSON read from a [Reader] into a `T`.
pub trait Extractor<T>: Send + Sync {
    fn extract(&self, context: &ExtractContext, reader: &mut Reader<'_>)
        -> Result<T, ExtractionError>;
}

/// An [Extractor] backed by a plain function or closure.
pub struct FnExtractor<F>(pub F);

impl<T, F> Extractor<T> for FnExtractor<F>
where
    F: Fn(&ExtractContext, &mut Reader<'_>) -> Result<T, ExtractionError> + Send + Sync,
{
    fn extract(
        &self,
        context: &ExtractContext,
        reader: &mut Reader<'_>,
    ) -> Result<T, ExtractionError> {
        (self.0)(context, reader)
    }
}

/// A set of extractors keyed by the destination type.
///
/// Cloning a `Formats` is cheap: registered extractors are shared.
#[derive(Clone, Default)]
pub struct Formats {
    extractors: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

static GLOBAL_FORMATS: Lazy<RwLock<Formats>> = Lazy::new(|| RwLock::new(Formats::new()));

impl Formats {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of the process-wide default formats, initialized empty on
    /// first use. Callers are expected to configure the default during
    /// startup.
    pub fn global() -> Formats {
        GLOBAL_FORMATS
            .read()
            .expect("global formats lock is not poisoned")
            .clone()
    }

    /// Replace the process-wide default formats.
    pub fn set_global(formats: Formats) {
        *GLOBAL_FORMATS
            .write()
            .expect("global formats lock is not poisoned") = formats;
    }

    /// Reset the process-wide default to an empty set.
    pub fn reset_global() {
        Self::set_global(Formats::new());
    }

    /// Register the extractor for `T`. A second registration for the same
    /// type fails with [DuplicateTypeError].
    pub fn register_extractor<T: 'static>(
        &mut self,
        extractor: Arc<dyn Extractor<T>>,
    ) -> Result<(), DuplicateTypeError> {
        let id = TypeId::of::<T>();
        if self.extractors.contains_key(&id) {
            return Err(DuplicateTypeError::new(demangle(type_name::<T>())));
        }
        self.extractors.insert(id, Arc::new(extractor));
        Ok(())
    }

    pub fn extractor<T: 'static>(&self) -> Option<Arc<dyn Extractor<T>>> {
        self.extractors
            .get(&TypeId::of::<T>())?
            .downcast_ref::<Arc<dyn Extractor<T>>>()
            .cloned()
    }
}

impl std::fmt::Debug for Formats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Formats")
            .field("registered", &self.extractors.len())
            .finish()
    }
}

/// The context handed to every [Extractor]: a formats handle, a [Version]
/// and an opaque user payload.
#[derive(Clone)]
pub struct ExtractContext {
    formats: Formats,
    version: Version,
    options: ExtractOptions,
    user_data: Option<Arc<dyn Any + Send + Sync>>,
}

impl Default for ExtractContext {
    /// A context over the process-wide default formats.
    fn default() -> Self {
        Self::new(Formats::global())
    }
}

impl ExtractContext {
    pub fn new(formats: Formats) -> Self {
        Self {
            formats,
            version: Version::default(),
            options: ExtractOptions::default(),
            user_data: None,
        }
    }

    pub fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    pub fn with_options(mut self, options: ExtractOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_user_data(mut self, user_data: Arc<dyn Any + Send + Sync>) -> Self {
        self.user_data = Some(user_data);
        self
    }

    pub fn formats(&self) -> &Formats {
        &self.formats
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    pub fn user_data(&self) -> Option<&Arc<dyn Any + Send + Sync>> {
        self.user_data.as_ref()
    }

    /// Run the registered extractor for `T` against `reader`.
    pub fn extract<T: 'static>(&self, reader: &mut Reader<'_>) -> Result<T, ExtractionError> {
        match self.formats.extractor::<T>() {
            Some(extractor) => extractor.extract(self, reader),
            None => {
                let path = reader
                    .current_path()
                    .cloned()
                    .unwrap_or_default();
                Err(ExtractionError::single(
                    path,
                    format!(
                        "no extractor registered for type {}",
                        demangle(type_name::<T>())
                    ),
                ))
            }
        }
    }
}

/// Extract a `T` from `reader` using the process-wide default formats.
pub fn extract<T: 'static>(reader: &mut Reader<'_>) -> Result<T, ExtractionError> {
    ExtractContext::default().extract(reader)
}

/// Accumulates extraction problems according to the failure policy: in
/// [OnError::FailImmediately] the first problem aborts; in
/// [OnError::CollectAll] problems accumulate up to `max_failures` before
/// the extraction gives up.
pub struct ProblemCollector {
    problems: Vec<Problem>,
    on_error: OnError,
    max_failures: usize,
}

impl ProblemCollector {
    pub fn new(options: &ExtractOptions) -> Self {
        Self {
            problems: Vec::new(),
            on_error: options.on_error,
            max_failures: options.max_failures.max(1),
        }
    }

    /// Record a problem. The returned error, when present, carries every
    /// problem collected so far and means the extraction must stop.
    pub fn push(&mut self, problem: Problem) -> Result<(), ExtractionError> {
        self.problems.push(problem);
        let stop = self.on_error == OnError::FailImmediately
            || self.problems.len() >= self.max_failures;
        if stop {
            Err(ExtractionError::new(std::mem::take(&mut self.problems)))
        } else {
            Ok(())
        }
    }

    /// Record a problem at `path` with `message`.
    pub fn report(
        &mut self,
        path: Path,
        message: impl Into<String>,
    ) -> Result<(), ExtractionError> {
        self.push(Problem::new(path, message))
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    /// Finish the extraction: succeeds when no problem was recorded.
    pub fn finish(self) -> Result<(), ExtractionError> {
        if self.problems.is_empty() {
            Ok(())
        } else {
            Err(ExtractionError::new(self.problems))
        }
    }
}

/// Hook rendering type names in error messages.
pub type DemangleFunction = fn(&'static str) -> String;

static DEMANGLE: Lazy<RwLock<DemangleFunction>> =
    Lazy::new(|| RwLock::new(|name: &'static str| name.to_owned()));

/// Install a hook used to render type names in error messages.
pub fn set_demangle_function(function: DemangleFunction) {
    *DEMANGLE.write().expect("demangle lock is not poisoned") = function;
}

/// Restore the identity demangle hook.
pub fn reset_demangle_function() {
    set_demangle_function(|name: &'static str| name.to_owned());
}

pub(crate) fn demangle(name: &'static str) -> String {
    (DEMANGLE.read().expect("demangle lock is not poisoned"))(name)
}
