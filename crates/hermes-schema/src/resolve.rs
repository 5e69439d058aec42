//! Field value resolution.
//!
//! A serializer field reads its value from the source object through a
//! chain of resolvers tried in a fixed order:
//!
//! 1. [`AttributeResolver`] - stored attribute of a [`Record`](crate::Record)
//! 2. [`MappingResolver`] - key of a [`Value::Map`]
//! 3. [`MethodResolver`] - computed attribute of a record
//!
//! A field may also carry its own [`FnResolver`], which takes priority over
//! the chain.

use std::fmt;
use std::sync::Arc;

use crate::value::Value;

/// Reads one value out of a source object.
pub trait Resolver: fmt::Debug + Send + Sync {
    /// Returns the value stored under `key`, or `None` if the source has none.
    fn resolve(&self, source: &Value, key: &str) -> Option<Value>;
}

/// Stored attribute lookup on records.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributeResolver;

impl Resolver for AttributeResolver {
    fn resolve(&self, source: &Value, key: &str) -> Option<Value> {
        match source {
            Value::Record(record) => record.attribute(key),
            _ => None,
        }
    }
}

/// Key lookup on mappings.
#[derive(Debug, Clone, Copy, Default)]
pub struct MappingResolver;

impl Resolver for MappingResolver {
    fn resolve(&self, source: &Value, key: &str) -> Option<Value> {
        match source {
            Value::Map(map) => map.get(key).cloned(),
            _ => None,
        }
    }
}

/// Computed attribute lookup on records.
#[derive(Debug, Clone, Copy, Default)]
pub struct MethodResolver;

impl Resolver for MethodResolver {
    fn resolve(&self, source: &Value, key: &str) -> Option<Value> {
        match source {
            Value::Record(record) => record.call(key),
            _ => None,
        }
    }
}

/// A resolver backed by a closure over the whole source object.
#[derive(Clone)]
pub struct FnResolver(Arc<dyn Fn(&Value) -> Option<Value> + Send + Sync>);

impl FnResolver {
    /// Wraps a closure.
    pub fn new(f: impl Fn(&Value) -> Option<Value> + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }
}

impl fmt::Debug for FnResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnResolver")
    }
}

impl Resolver for FnResolver {
    fn resolve(&self, source: &Value, _key: &str) -> Option<Value> {
        (self.0)(source)
    }
}

/// Ordered list of resolvers; the first hit wins.
#[derive(Debug, Clone)]
pub struct ResolverChain {
    resolvers: Vec<Arc<dyn Resolver>>,
}

impl Default for ResolverChain {
    fn default() -> Self {
        Self {
            resolvers: vec![
                Arc::new(AttributeResolver),
                Arc::new(MappingResolver),
                Arc::new(MethodResolver),
            ],
        }
    }
}

impl ResolverChain {
    /// A chain with the given resolvers.
    #[must_use]
    pub fn new(resolvers: Vec<Arc<dyn Resolver>>) -> Self {
        Self { resolvers }
    }

    /// Appends a resolver at lowest priority.
    #[must_use]
    pub fn then(mut self, resolver: impl Resolver + 'static) -> Self {
        self.resolvers.push(Arc::new(resolver));
        self
    }

    /// Resolves `key` against `source`.
    #[must_use]
    pub fn resolve(&self, source: &Value, key: &str) -> Option<Value> {
        self.resolvers.iter().find_map(|r| r.resolve(source, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Record;
    use indexmap::IndexMap;

    #[derive(Debug)]
    struct User;

    impl Record for User {
        fn type_name(&self) -> &str {
            "User"
        }

        fn attribute(&self, name: &str) -> Option<Value> {
            match name {
                "name" => Some(Value::from("ada")),
                _ => None,
            }
        }

        fn call(&self, name: &str) -> Option<Value> {
            match name {
                "name" => Some(Value::from("shadowed")),
                "display_name" => Some(Value::from("Ada")),
                _ => None,
            }
        }
    }

    #[test]
    fn test_attribute_before_method() {
        let chain = ResolverChain::default();
        let user = Value::record(User);
        assert_eq!(chain.resolve(&user, "name"), Some(Value::from("ada")));
        assert_eq!(chain.resolve(&user, "display_name"), Some(Value::from("Ada")));
        assert_eq!(chain.resolve(&user, "missing"), None);
    }

    #[test]
    fn test_mapping_lookup() {
        let mut map = IndexMap::new();
        map.insert("count".to_string(), Value::Int(3));
        let chain = ResolverChain::default();
        assert_eq!(chain.resolve(&Value::Map(map), "count"), Some(Value::Int(3)));
        assert_eq!(chain.resolve(&Value::Int(1), "count"), None);
    }

    #[test]
    fn test_custom_resolver_appended() {
        let chain = ResolverChain::default().then(FnResolver::new(|_| Some(Value::Int(0))));
        assert_eq!(chain.resolve(&Value::Null, "anything"), Some(Value::Int(0)));
    }
}
