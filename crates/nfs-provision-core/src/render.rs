//! Gateway configuration rendering.
//!
//! Everything here is a pure function of its inputs: the same identity and
//! spec always produce byte-identical output, and nothing touches a backend.

use crate::types::{CredentialEntity, DaemonIdentity, RenderedConfig, ServiceSpec};
use std::collections::BTreeMap;

/// File name of the generated gateway configuration
pub const GANESHA_CONF: &str = "ganesha.conf";

/// Name of the configuration object for a service
#[must_use]
pub fn config_object_name(spec: &ServiceSpec) -> String {
    format!("conf-{}", spec.service_name)
}

/// `rados://<pool>/[<namespace>/]<object>` locator for the configuration object
#[must_use]
pub fn watch_url(spec: &ServiceSpec) -> String {
    let mut url = format!("rados://{}/", spec.pool);
    if let Some(ns) = spec.namespace() {
        url.push_str(ns);
        url.push('/');
    }
    url.push_str(&config_object_name(spec));
    url
}

fn ganesha_conf(user: &str, url: &str) -> String {
    format!(
        "# generated by nfs-provision
RADOS_URLS {{
        UserId = \"{user}\";
        watch_url = \"{url}\";
}}

%url    {url}
"
    )
}

/// Render the configuration payload for one daemon
///
/// `identity` should have passed [`DaemonIdentity::validate`]; see
/// [`CredentialEntity::for_daemon`] for the naming precondition.
#[must_use]
pub fn render_service_config(identity: &DaemonIdentity, spec: &ServiceSpec) -> RenderedConfig {
    let entity = CredentialEntity::for_daemon(identity);
    let url = watch_url(spec);

    let mut files = BTreeMap::new();
    files.insert(GANESHA_CONF.to_string(), ganesha_conf(entity.name(), &url));

    RenderedConfig {
        pool: spec.pool.clone(),
        namespace: spec.namespace().map(str::to_string),
        files,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_url_without_namespace() {
        let spec = ServiceSpec::nfs("foo", "ganesha-pool");
        assert_eq!(watch_url(&spec), "rados://ganesha-pool/conf-nfs.foo");
    }

    #[test]
    fn watch_url_with_namespace() {
        let spec = ServiceSpec::nfs("foo", "nfs-ganesha").with_namespace("export1");
        assert_eq!(watch_url(&spec), "rados://nfs-ganesha/export1/conf-nfs.foo");
    }

    #[test]
    fn renders_ganesha_conf() {
        let identity = DaemonIdentity::new("nfs", "foo");
        let spec = ServiceSpec::nfs("foo", "ganesha-pool");
        let rendered = render_service_config(&identity, &spec);

        assert_eq!(rendered.pool, "ganesha-pool");
        assert_eq!(rendered.namespace, None);
        assert_eq!(
            rendered.file(GANESHA_CONF).unwrap(),
            "# generated by nfs-provision\n\
             RADOS_URLS {\n\
             \x20       UserId = \"nfs.foo\";\n\
             \x20       watch_url = \"rados://ganesha-pool/conf-nfs.foo\";\n\
             }\n\
             \n\
             %url    rados://ganesha-pool/conf-nfs.foo\n"
        );
    }

    #[test]
    fn render_is_deterministic() {
        let identity = DaemonIdentity::new("nfs", "foo");
        let spec = ServiceSpec::nfs("foo", "pool").with_namespace("ns");
        let a = render_service_config(&identity, &spec).to_json().unwrap();
        let b = render_service_config(&identity, &spec).to_json().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn namespace_carried_into_payload() {
        let identity = DaemonIdentity::new("nfs", "bar");
        let spec = ServiceSpec::nfs("foo", "pool").with_namespace("ns");
        let rendered = render_service_config(&identity, &spec);
        assert_eq!(rendered.namespace.as_deref(), Some("ns"));
        assert!(rendered
            .file(GANESHA_CONF)
            .unwrap()
            .contains("UserId = \"nfs.bar\";"));
    }
}
