//! Typed access to schema capabilities stored in endpoint metadata.

use hermes_core::{Meta, KIND_FORM, KIND_MODEL, KIND_SERIALIZER};

use crate::form::Form;
use crate::model_form::ModelForm;
use crate::schema::Schema;
use crate::store::Model;

/// Typed getters for capabilities declared in a [`Meta`].
pub trait MetaExt {
    /// Form declared under `key`. A model form yields its derived form.
    fn form(&self, key: &str) -> Option<&Form>;

    /// Model form declared under `key`.
    fn model_form(&self, key: &str) -> Option<&ModelForm>;

    /// The `serializer` schema.
    fn serializer(&self) -> Option<&Schema>;

    /// The `model` handle.
    fn model(&self) -> Option<&Model>;
}

impl MetaExt for Meta {
    fn form(&self, key: &str) -> Option<&Form> {
        let reference = self.capability(key).filter(|r| r.kind() == KIND_FORM)?;
        reference
            .downcast_ref::<Form>()
            .or_else(|| reference.downcast_ref::<ModelForm>().map(ModelForm::form))
    }

    fn model_form(&self, key: &str) -> Option<&ModelForm> {
        self.capability(key)
            .filter(|r| r.kind() == KIND_FORM)?
            .downcast_ref::<ModelForm>()
    }

    fn serializer(&self) -> Option<&Schema> {
        self.capability("serializer")
            .filter(|r| r.kind() == KIND_SERIALIZER)?
            .downcast_ref::<Schema>()
    }

    fn model(&self) -> Option<&Model> {
        self.capability("model")
            .filter(|r| r.kind() == KIND_MODEL)?
            .downcast_ref::<Model>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::SchemaField;
    use crate::form::FormField;
    use crate::memory::MemoryStore;
    use crate::model::{ModelDescriptor, ModelField, StorageKind};
    use hermes_core::{Expected, HttpMethod, MetaLayer, MetaRule, MetaSchema};

    #[test]
    fn test_typed_capabilities() {
        let store = MemoryStore::new(
            ModelDescriptor::new("Thing")
                .field(ModelField::new("id", StorageKind::Auto))
                .field(ModelField::new("name", StorageKind::Char)),
        );
        let model_form = ModelForm::builder("ThingForm", store.model()).build().unwrap();

        let schema = MetaSchema::base()
            .rule("model", MetaRule::optional(Expected::SubclassOf(KIND_MODEL)))
            .rule("model_form", MetaRule::optional(Expected::SubclassOf(KIND_FORM)));
        let layer = MetaLayer::new()
            .method(HttpMethod::Post)
            .tags(["thing"])
            .set("query_form", Form::new("Q").with_field("id", FormField::integer()))
            .set("serializer", Schema::new("ThingSerializer").with_field("id", SchemaField::int()))
            .set("model", store.model())
            .set("model_form", model_form);
        let meta = Meta::define("CreateThing", None, layer, &schema).unwrap();

        assert_eq!(meta.form("query_form").unwrap().name(), "Q");
        assert_eq!(meta.form("model_form").unwrap().name(), "ThingForm");
        assert!(meta.model_form("query_form").is_none());
        assert_eq!(meta.model_form("model_form").unwrap().name(), "ThingForm");
        assert_eq!(meta.serializer().unwrap().name(), "ThingSerializer");
        assert_eq!(meta.model().unwrap().name(), "Thing");
        assert!(meta.form("body_form").is_none());
    }
}
