use super::schema::FieldCleaner;
use serde_json::{Map, Value};
use tracing::trace;

impl FieldCleaner {
    /// Bookkeeping fields the Kubernetes API server and its clients add to
    /// objects: managed fields, resource versions, rollout annotations and
    /// the whole `status` section.
    pub fn kubernetes_managed_fields() -> Self {
        FieldCleaner::new()
            .nest(
                "metadata",
                FieldCleaner::new()
                    .remove([
                        "managedFields",
                        "creationTimestamp",
                        "generation",
                        "resourceVersion",
                        "uid",
                        "finalizers",
                    ])
                    .nest(
                        "labels",
                        FieldCleaner::new().remove(["app.kubernetes.io/managed-by"]),
                    )
                    .nest(
                        "annotations",
                        FieldCleaner::new().remove([
                            "deployment.kubernetes.io/revision",
                            "kubectl.kubernetes.io/last-applied-configuration",
                        ]),
                    ),
            )
            .nest("status", FieldCleaner::new())
    }

    /// Strip the described fields from `value` in place.
    ///
    /// Objects are cleaned directly and arrays element by element. Scalars
    /// have nothing to strip and are left alone.
    pub fn clean(&self, value: &mut Value) {
        match value {
            Value::Object(map) => self.clean_object(map),
            Value::Array(items) => {
                for item in items {
                    self.clean(item);
                }
            }
            _ => {}
        }
    }

    fn clean_object(&self, map: &mut Map<String, Value>) {
        for key in &self.fields {
            if map.remove(key).is_some() {
                trace!(key = %key, "removed field");
            }
        }

        for (key, cleaner) in &self.nested {
            if cleaner.is_empty() {
                if map.remove(key).is_some() {
                    trace!(key = %key, "removed section");
                }
                continue;
            }
            if let Some(sub_tree) = map.get_mut(key) {
                cleaner.clean(sub_tree);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn managed_fields_preset_strips_server_state() {
        let mut namespace = json!({
            "apiVersion": "v1",
            "kind": "Namespace",
            "metadata": {
                "creationTimestamp": "2022-09-26T09:54:21Z",
                "labels": {
                    "app.kubernetes.io/managed-by": "Helm",
                    "kubernetes.io/metadata.name": "test",
                    "name": "test"
                },
                "name": "test",
                "resourceVersion": "29601",
                "uid": "333e29cc-24d0-496b-a376-d801676c86c5"
            },
            "spec": {"finalizers": ["kubernetes"]},
            "status": {"phase": "Active"}
        });

        FieldCleaner::kubernetes_managed_fields().clean(&mut namespace);

        assert_eq!(
            namespace,
            json!({
                "apiVersion": "v1",
                "kind": "Namespace",
                "metadata": {
                    "labels": {
                        "kubernetes.io/metadata.name": "test",
                        "name": "test"
                    },
                    "name": "test"
                },
                "spec": {"finalizers": ["kubernetes"]}
            })
        );
    }

    #[test]
    fn arrays_are_cleaned_per_element() {
        let cleaner =
            FieldCleaner::new().nest("containers", FieldCleaner::new().remove(["resources"]));
        let mut spec = json!({
            "containers": [
                {"name": "a", "resources": {}},
                "not-an-object",
                {"name": "b"}
            ]
        });

        cleaner.clean(&mut spec);
        assert_eq!(
            spec,
            json!({"containers": [{"name": "a"}, "not-an-object", {"name": "b"}]})
        );
    }

    #[test]
    fn scalars_under_nested_keys_are_left_alone() {
        let cleaner = FieldCleaner::new().nest("metadata", FieldCleaner::new().remove(["uid"]));
        let mut doc = json!({"metadata": "opaque"});
        cleaner.clean(&mut doc);
        assert_eq!(doc, json!({"metadata": "opaque"}));
    }
}
