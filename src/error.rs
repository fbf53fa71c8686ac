/// Errors raised while defining or composing shared example groups.
///
/// All of these are authoring errors in a test suite definition. They surface
/// synchronously at the call that caused them and are never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum SharedError {
    /// A label or type key was registered twice.
    #[error("Shared example group '{label}' already exists")]
    DuplicateRegistration { label: String },

    /// A composition or nested lookup named a key without a template.
    #[error("Could not find shared example group named '{label}'")]
    UnresolvedReference { label: String },

    /// The given key arguments do not form a known key shape.
    #[error("unsupported shared example group key shape: ({shape})")]
    UnsupportedKeyShape { shape: String },

    /// A registration arrived after the definition phase ended.
    #[error("cannot register shared example group '{label}', the registry is frozen")]
    RegistryFrozen { label: String },

    /// A helper method was called on a group that does not define it.
    #[error("undefined helper method `{name}` for example group '{group}'")]
    UndefinedHelper { name: String, group: String },
}
