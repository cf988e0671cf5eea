// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use kube::CustomResource;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::common::{ClusterAffinity, ResourceSelector};

/// Overrides fields of propagated resources per target cluster
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[kube(group = "policy.karmada.io", version = "v1alpha1", kind = "OverridePolicy")]
#[kube(plural = "overridepolicies", shortname = "op")]
#[kube(namespaced)]
#[serde(rename_all = "camelCase")]
pub struct OverrideSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resource_selectors: Vec<ResourceSelector>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub override_rules: Vec<RuleWithCluster>,
}

/// Cluster-scoped variant of `OverridePolicy`
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[kube(group = "policy.karmada.io", version = "v1alpha1", kind = "ClusterOverridePolicy")]
#[kube(plural = "clusteroverridepolicies", shortname = "cop")]
pub struct ClusterOverrideSpec {
    #[serde(flatten)]
    pub overrides: OverrideSpec,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RuleWithCluster {
    /// Clusters the rule applies to; all clusters when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_cluster: Option<ClusterAffinity>,
    pub overriders: Overriders,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Overriders {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plaintext: Vec<PlaintextOverrider>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub image_overrider: Vec<ImageOverrider>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub command_overrider: Vec<CommandArgsOverrider>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args_overrider: Vec<CommandArgsOverrider>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels_overrider: Vec<LabelAnnotationOverrider>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations_overrider: Vec<LabelAnnotationOverrider>,
}

/// JSON patch style override
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaintextOverrider {
    pub path: String,
    /// `add`, `remove` or `replace`
    pub operator: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageOverrider {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicate: Option<ImagePredicate>,
    /// `Registry`, `Repository` or `Tag`
    pub component: String,
    pub operator: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImagePredicate {
    pub path: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommandArgsOverrider {
    pub container_name: String,
    /// `add` or `remove`
    pub operator: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub value: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LabelAnnotationOverrider {
    pub operator: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub value: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::CustomResourceExt;

    #[test]
    fn test_parses_override_rules() {
        let spec: OverrideSpec = serde_yaml::from_str(
            r#"
resourceSelectors:
  - apiVersion: apps/v1
    kind: Deployment
    name: nginx
overrideRules:
  - targetCluster:
      clusterNames: [member1]
    overriders:
      imageOverrider:
        - component: Registry
          operator: replace
          value: registry.member1.example
      labelsOverrider:
        - operator: add
          value:
            env: staging
  - overriders:
      plaintext:
        - path: /spec/replicas
          operator: replace
          value: 3
"#,
        )
        .unwrap();

        assert_eq!(spec.override_rules.len(), 2);
        let first = &spec.override_rules[0];
        assert_eq!(
            first.target_cluster.as_ref().unwrap().cluster_names,
            vec!["member1"]
        );
        assert_eq!(first.overriders.image_overrider[0].component, "Registry");
        assert_eq!(first.overriders.labels_overrider[0].value["env"], "staging");

        let second = &spec.override_rules[1];
        assert!(second.target_cluster.is_none());
        assert_eq!(
            second.overriders.plaintext[0].value,
            Some(serde_json::json!(3))
        );
    }

    #[test]
    fn test_rule_without_overriders_is_rejected() {
        let result: Result<OverrideSpec, _> = serde_json::from_value(serde_json::json!({
            "overrideRules": [{"targetCluster": {"clusterNames": ["member1"]}}]
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_crd_scopes() {
        assert_eq!(OverridePolicy::crd().spec.scope, "Namespaced");
        assert_eq!(ClusterOverridePolicy::crd().spec.scope, "Cluster");
        assert_eq!(
            ClusterOverridePolicy::crd().spec.names.plural,
            "clusteroverridepolicies"
        );
    }
}
