//! Kubernetes client construction and revision lookups
//!
//! Builds a `kube::Client` from the kubeconfig flags and reads revision
//! history from ReplicaSets and ControllerRevisions.

use crate::cli::flags::ConfigFlags;
use crate::cluster::traits::RevisionSource;
use crate::cluster::warnings::{self, WarningLayer};
use crate::domain::{Revision, RevisionList, Target, WorkloadKind};
use crate::error::ClusterError;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use k8s_openapi::api::apps::v1::{
    ControllerRevision, DaemonSet, Deployment, ReplicaSet, StatefulSet,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta, Time};
use k8s_openapi::NamespaceResourceScope;
use kube::api::{Api, ListParams};
use kube::client::ClientBuilder;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config, Resource, ResourceExt};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt::Debug;

/// Annotation carrying a ReplicaSet's revision number
pub const REVISION_ANNOTATION: &str = "deployment.kubernetes.io/revision";

/// Annotation recording why a rollout happened
pub const CHANGE_CAUSE_ANNOTATION: &str = "kubernetes.io/change-cause";

/// Label added by the Deployment controller to every ReplicaSet template
pub const POD_TEMPLATE_HASH_LABEL: &str = "pod-template-hash";

/// Cluster client for revision lookups
#[derive(Clone)]
pub struct KubeClient {
    client: Client,
    namespace: String,
}

impl KubeClient {
    /// Connect using kubeconfig flags
    ///
    /// The client reports API warnings to the handler installed with
    /// [`warnings::set_default_handler`] at the time of the call.
    pub async fn connect(flags: &ConfigFlags) -> Result<Self, ClusterError> {
        let config = Self::config(flags).await?;
        let namespace = config.default_namespace.clone();

        log::debug!(
            "connecting to {} (namespace {})",
            config.cluster_url,
            namespace
        );

        let client = ClientBuilder::try_from(config)?
            .with_layer(&WarningLayer::new(warnings::default_handler()))
            .build();

        Ok(Self { client, namespace })
    }

    /// Resolve the client configuration from kubeconfig and flag overrides
    pub async fn config(flags: &ConfigFlags) -> Result<Config, ClusterError> {
        let mut config = match load_kubeconfig(flags)? {
            Some(kubeconfig) => {
                let options = KubeConfigOptions {
                    context: flags.context.clone(),
                    cluster: flags.cluster.clone(),
                    user: flags.user.clone(),
                };
                Config::from_custom_kubeconfig(kubeconfig, &options)
                    .await
                    .map_err(|e| ClusterError::Kubeconfig(e.to_string()))?
            }
            None => match &flags.server {
                Some(server) => Config::new(parse_server(server)?),
                None => Config::incluster().map_err(|e| {
                    ClusterError::Kubeconfig(format!(
                        "no kubeconfig found and not running in a cluster: {}",
                        e
                    ))
                })?,
            },
        };

        apply_overrides(&mut config, flags)?;
        Ok(config)
    }

    async fn get_workload<K>(&self, kind: WorkloadKind, name: &str) -> Result<K, ClusterError>
    where
        K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>
            + Clone
            + DeserializeOwned
            + Debug,
    {
        let api: Api<K> = Api::namespaced(self.client.clone(), &self.namespace);
        api.get_opt(name)
            .await?
            .ok_or_else(|| ClusterError::NotFound {
                kind: kind.to_string(),
                name: name.to_string(),
                namespace: self.namespace.clone(),
            })
    }

    async fn deployment_revisions(&self, name: &str) -> Result<RevisionList, ClusterError> {
        let deployment: Deployment = self.get_workload(WorkloadKind::Deployment, name).await?;
        let uid = owner_uid(&deployment.metadata, name)?;
        let params = list_params(deployment.spec.as_ref().map(|s| &s.selector));

        let api: Api<ReplicaSet> = Api::namespaced(self.client.clone(), &self.namespace);
        let replica_sets = api.list(&params).await?;
        log::debug!(
            "found {} replicasets for deployment {}",
            replica_sets.items.len(),
            name
        );

        let mut revisions = Vec::new();
        for rs in replica_sets
            .items
            .iter()
            .filter(|rs| is_controlled_by(&rs.metadata, &uid))
        {
            if let Some(revision) = replica_set_revision(rs)? {
                revisions.push(revision);
            }
        }

        Ok(RevisionList::new(revisions))
    }

    async fn controller_revisions(
        &self,
        kind: WorkloadKind,
        name: &str,
    ) -> Result<RevisionList, ClusterError> {
        let (uid, selector) = match kind {
            WorkloadKind::StatefulSet => {
                let sts: StatefulSet = self.get_workload(kind, name).await?;
                (owner_uid(&sts.metadata, name)?, sts.spec.map(|s| s.selector))
            }
            WorkloadKind::DaemonSet => {
                let ds: DaemonSet = self.get_workload(kind, name).await?;
                (owner_uid(&ds.metadata, name)?, ds.spec.map(|s| s.selector))
            }
            WorkloadKind::Deployment => return self.deployment_revisions(name).await,
        };

        let api: Api<ControllerRevision> = Api::namespaced(self.client.clone(), &self.namespace);
        let history = api.list(&list_params(selector.as_ref())).await?;
        log::debug!(
            "found {} controllerrevisions for {} {}",
            history.items.len(),
            kind,
            name
        );

        let revisions = history
            .items
            .iter()
            .filter(|cr| is_controlled_by(&cr.metadata, &uid))
            .map(controller_revision)
            .collect();

        Ok(RevisionList::new(revisions))
    }
}

#[async_trait]
impl RevisionSource for KubeClient {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn revisions(&self, target: &Target) -> Result<RevisionList, ClusterError> {
        match target.kind {
            WorkloadKind::Deployment => self.deployment_revisions(&target.name).await,
            WorkloadKind::StatefulSet | WorkloadKind::DaemonSet => {
                self.controller_revisions(target.kind, &target.name).await
            }
        }
    }
}

fn load_kubeconfig(flags: &ConfigFlags) -> Result<Option<Kubeconfig>, ClusterError> {
    if let Some(path) = &flags.kubeconfig {
        return Kubeconfig::read_from(path).map(Some).map_err(|e| {
            ClusterError::Kubeconfig(format!("{}: {}", path.display(), e))
        });
    }

    match Kubeconfig::read() {
        Ok(kubeconfig) => Ok(Some(kubeconfig)),
        Err(e) => {
            log::debug!("no default kubeconfig: {}", e);
            Ok(None)
        }
    }
}

fn parse_server(server: &str) -> Result<http::Uri, ClusterError> {
    server.parse().map_err(|e: http::uri::InvalidUri| ClusterError::InvalidFlag {
        flag: "server".to_string(),
        message: e.to_string(),
    })
}

fn apply_overrides(config: &mut Config, flags: &ConfigFlags) -> Result<(), ClusterError> {
    if let Some(server) = &flags.server {
        config.cluster_url = parse_server(server)?;
    }
    if let Some(namespace) = &flags.namespace {
        config.default_namespace = namespace.clone();
    }
    if let Some(token) = &flags.token {
        config.auth_info.token = Some(token.clone().into());
        config.auth_info.exec = None;
        config.auth_info.auth_provider = None;
    }
    if flags.username.is_some() || flags.password.is_some() {
        log::warn!("--username and --password are deprecated, use --token instead");
        config.auth_info.username = flags.username.clone();
        config.auth_info.password = flags.password.clone().map(Into::into);
    }
    if let Some(user) = &flags.impersonate {
        config.auth_info.impersonate = Some(user.clone());
    }
    if !flags.impersonate_groups.is_empty() {
        if flags.impersonate.is_none() {
            return Err(ClusterError::InvalidFlag {
                flag: "as-group".to_string(),
                message: "requires --as to be set".to_string(),
            });
        }
        config.auth_info.impersonate_groups = Some(flags.impersonate_groups.clone());
    }
    if let Some(name) = &flags.tls_server_name {
        config.tls_server_name = Some(name.clone());
    }
    if flags.insecure_skip_tls_verify {
        config.accept_invalid_certs = true;
    }
    if let Some(timeout) = flags.request_timeout {
        let timeout = (!timeout.is_zero()).then_some(timeout);
        config.read_timeout = timeout;
        config.write_timeout = timeout;
    }
    Ok(())
}

fn owner_uid(meta: &ObjectMeta, name: &str) -> Result<String, ClusterError> {
    meta.uid.clone().ok_or_else(|| ClusterError::InvalidRevision {
        name: name.to_string(),
        reason: "object has no UID".to_string(),
    })
}

fn list_params(selector: Option<&LabelSelector>) -> ListParams {
    match selector_string(selector) {
        Some(labels) => ListParams::default().labels(&labels),
        None => ListParams::default(),
    }
}

/// Render the `matchLabels` part of a selector; expressions are left to the owner filter
fn selector_string(selector: Option<&LabelSelector>) -> Option<String> {
    let labels = selector?.match_labels.as_ref()?;
    if labels.is_empty() {
        return None;
    }
    Some(
        labels
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(","),
    )
}

fn is_controlled_by(meta: &ObjectMeta, uid: &str) -> bool {
    meta.owner_references
        .as_ref()
        .is_some_and(|refs| refs.iter().any(|r| r.controller == Some(true) && r.uid == uid))
}

fn replica_set_revision(rs: &ReplicaSet) -> Result<Option<Revision>, ClusterError> {
    let name = rs.name_any();
    let Some(number) = rs.annotations().get(REVISION_ANNOTATION) else {
        log::debug!("replicaset {} has no revision annotation", name);
        return Ok(None);
    };
    let Ok(number) = number.parse::<i64>() else {
        log::debug!("replicaset {} has invalid revision {:?}", name, number);
        return Ok(None);
    };

    let mut template = match rs.spec.as_ref().and_then(|s| s.template.as_ref()) {
        Some(t) => serde_json::to_value(t).map_err(|e| ClusterError::InvalidRevision {
            name: name.clone(),
            reason: e.to_string(),
        })?,
        None => Value::Null,
    };
    strip_pod_template_hash(&mut template);

    Ok(Some(with_meta(
        Revision::new(number, name, template),
        &rs.metadata,
    )))
}

fn controller_revision(cr: &ControllerRevision) -> Revision {
    let template = cr
        .data
        .as_ref()
        .map(|data| {
            data.0
                .pointer("/spec/template")
                .cloned()
                .unwrap_or_else(|| data.0.clone())
        })
        .unwrap_or(Value::Null);

    with_meta(Revision::new(cr.revision, cr.name_any(), template), &cr.metadata)
}

fn with_meta(mut revision: Revision, meta: &ObjectMeta) -> Revision {
    revision.created = meta.creation_timestamp.as_ref().and_then(parse_time);
    revision.change_cause = meta
        .annotations
        .as_ref()
        .and_then(|a| a.get(CHANGE_CAUSE_ANNOTATION))
        .cloned();
    revision
}

/// Convert through the RFC 3339 wire form of `Time`
fn parse_time(time: &Time) -> Option<DateTime<Utc>> {
    let value = serde_json::to_value(time).ok()?;
    value.as_str()?.parse().ok()
}

fn strip_pod_template_hash(template: &mut Value) {
    if let Some(labels) = template
        .pointer_mut("/metadata/labels")
        .and_then(Value::as_object_mut)
    {
        labels.remove(POD_TEMPLATE_HASH_LABEL);
    }
}
