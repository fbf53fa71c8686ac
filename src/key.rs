//! Shared group keys.
//!
//! A shared example group can be registered and looked up under several key
//! shapes: a string, a symbol, a type, an option set (tags), or a label
//! followed by tags. The raw shapes arrive as [`KeyArgs`] and are normalized by
//! [`resolve`] into a [`ResolvedKey`].
//!
//! Label keys compare by value. A [`Symbol`] and a string with the same text
//! resolve to the same label, so `"name"` and `Symbol::new("name")` name the
//! same shared group. Type keys compare by [`TypeId`] only. Tagged keys never
//! take part in direct lookup; they are routed to the
//! [`Configuration`](crate::config::Configuration).

use std::{
    any::{TypeId, type_name},
    borrow::Cow,
    collections::BTreeMap,
    fmt::{self, Display},
    hash::{Hash, Hasher},
};

use crate::{
    error::SharedError,
    whatever::{BoxedWhatever, Whatever, boxed},
};

/// A symbolic label, the counterpart of a plain string label.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(pub Cow<'static, str>);

impl Symbol {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", self.0)
    }
}

/// A key naming a type, compared by identity.
#[derive(Debug, Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// An ordered option set used to select groups by their tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags(BTreeMap<Cow<'static, str>, BoxedWhatever>);

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<Cow<'static, str>>, value: impl Whatever) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<Cow<'static, str>>, value: impl Whatever) {
        self.0.insert(name.into(), boxed(value));
    }

    pub fn get(&self, name: &str) -> Option<&dyn Whatever> {
        self.0.get(name).map(|value| &**value)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &dyn Whatever)> {
        self.0
            .iter()
            .map(|(name, value)| (name.as_ref(), &**value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for Tags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        f.write_str("}")
    }
}

/// A single raw argument of a registration or lookup call.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum KeyArg {
    Str(Cow<'static, str>),
    Symbol(Symbol),
    Type(TypeKey),
    Options(Tags),
}

impl KeyArg {
    fn shape(&self) -> &'static str {
        match self {
            KeyArg::Str(_) => "string",
            KeyArg::Symbol(_) => "symbol",
            KeyArg::Type(_) => "type",
            KeyArg::Options(_) => "options",
        }
    }
}

impl From<&'static str> for KeyArg {
    fn from(value: &'static str) -> Self {
        Self::Str(value.into())
    }
}

impl From<String> for KeyArg {
    fn from(value: String) -> Self {
        Self::Str(value.into())
    }
}

impl From<Symbol> for KeyArg {
    fn from(value: Symbol) -> Self {
        Self::Symbol(value)
    }
}

impl From<TypeKey> for KeyArg {
    fn from(value: TypeKey) -> Self {
        Self::Type(value)
    }
}

impl From<Tags> for KeyArg {
    fn from(value: Tags) -> Self {
        Self::Options(value)
    }
}

/// The raw arguments identifying a shared group, before normalization.
///
/// Tags can follow a label but not a type:
///
/// ```compile_fail
/// use kitest_shared::{Tags, TypeKey, key::KeyArgs};
///
/// let _ = KeyArgs::from((TypeKey::of::<u8>(), Tags::new()));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyArgs(Vec<KeyArg>);

impl KeyArgs {
    pub fn as_slice(&self) -> &[KeyArg] {
        &self.0
    }
}

impl FromIterator<KeyArg> for KeyArgs {
    fn from_iter<T: IntoIterator<Item = KeyArg>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<Vec<KeyArg>> for KeyArgs {
    fn from(value: Vec<KeyArg>) -> Self {
        Self(value)
    }
}

macro_rules! single_key_args {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for KeyArgs {
                fn from(value: $ty) -> Self {
                    Self(vec![KeyArg::from(value)])
                }
            }
        )*
    };
}

// Only labels can carry tags.
macro_rules! tagged_key_args {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<($ty, Tags)> for KeyArgs {
                fn from((value, tags): ($ty, Tags)) -> Self {
                    Self(vec![KeyArg::from(value), KeyArg::Options(tags)])
                }
            }
        )*
    };
}

single_key_args!(&'static str, String, Symbol, TypeKey);
tagged_key_args!(&'static str, String, Symbol);

impl From<Tags> for KeyArgs {
    fn from(value: Tags) -> Self {
        Self(vec![KeyArg::Options(value)])
    }
}

impl From<KeyArg> for KeyArgs {
    fn from(value: KeyArg) -> Self {
        Self(vec![value])
    }
}

impl From<TemplateKey> for KeyArgs {
    fn from(value: TemplateKey) -> Self {
        match value {
            TemplateKey::Label(label) => Self(vec![KeyArg::Str(label)]),
            TemplateKey::Type(ty) => Self(vec![KeyArg::Type(ty)]),
        }
    }
}

/// The canonical identity of a template in the direct-lookup registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TemplateKey {
    Label(Cow<'static, str>),
    Type(TypeKey),
}

impl TemplateKey {
    pub fn label(label: impl Into<Cow<'static, str>>) -> Self {
        Self::Label(label.into())
    }

    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::Type(TypeKey::of::<T>())
    }
}

impl Display for TemplateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateKey::Label(label) => f.write_str(label),
            TemplateKey::Type(ty) => Display::fmt(ty, f),
        }
    }
}

impl From<&'static str> for TemplateKey {
    fn from(value: &'static str) -> Self {
        Self::Label(value.into())
    }
}

impl From<String> for TemplateKey {
    fn from(value: String) -> Self {
        Self::Label(value.into())
    }
}

impl From<Symbol> for TemplateKey {
    fn from(value: Symbol) -> Self {
        Self::Label(value.0)
    }
}

impl From<TypeKey> for TemplateKey {
    fn from(value: TypeKey) -> Self {
        Self::Type(value)
    }
}

/// The outcome of [`resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedKey {
    /// A label or type key used for direct lookup.
    Direct(TemplateKey),

    /// A label with tags, handled by the configuration hook.
    Tagged {
        label: Cow<'static, str>,
        tags: Tags,
    },
}

/// Normalize raw key arguments into a [`ResolvedKey`].
pub fn resolve(args: &KeyArgs) -> Result<ResolvedKey, SharedError> {
    match args.as_slice() {
        [KeyArg::Str(label)] | [KeyArg::Symbol(Symbol(label))] => {
            Ok(ResolvedKey::Direct(TemplateKey::Label(label.clone())))
        }
        [KeyArg::Type(ty)] => Ok(ResolvedKey::Direct(TemplateKey::Type(*ty))),
        [KeyArg::Options(tags)] => Ok(ResolvedKey::Tagged {
            label: Cow::Borrowed(""),
            tags: tags.clone(),
        }),
        [
            KeyArg::Str(label) | KeyArg::Symbol(Symbol(label)),
            KeyArg::Options(tags),
        ] => Ok(ResolvedKey::Tagged {
            label: label.clone(),
            tags: tags.clone(),
        }),
        other => Err(SharedError::UnsupportedKeyShape {
            shape: other
                .iter()
                .map(KeyArg::shape)
                .collect::<Vec<_>>()
                .join(", "),
        }),
    }
}

/// Resolve raw key arguments that must name a template directly.
///
/// Tagged keys have no entry in the direct-lookup registry, so they are
/// rejected as an unsupported shape here.
pub fn resolve_direct(args: &KeyArgs) -> Result<TemplateKey, SharedError> {
    match resolve(args)? {
        ResolvedKey::Direct(key) => Ok(key),
        ResolvedKey::Tagged { .. } => Err(SharedError::UnsupportedKeyShape {
            shape: args
                .as_slice()
                .iter()
                .map(KeyArg::shape)
                .collect::<Vec<_>>()
                .join(", "),
        }),
    }
}
