use anyhow::{bail, Result};
use std::fmt;

const S3_SCHEME: &str = "s3://";

/// Where a stack's state lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    S3(S3Location),
    /// Any backend without object-level lock handling (`file://`, Pulumi Cloud, ...).
    Other(String),
}

/// `s3://bucket[/prefix][?region=...]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Location {
    pub url: String,
    pub bucket: String,
    pub prefix: Option<String>,
    pub region: Option<String>,
}

impl Backend {
    pub fn parse(url: &str) -> Result<Self> {
        let Some(rest) = url.strip_prefix(S3_SCHEME) else {
            return Ok(Self::Other(url.to_string()));
        };

        let (path, query) = rest.split_once('?').unwrap_or((rest, ""));
        let (bucket, prefix) = path.split_once('/').unwrap_or((path, ""));
        if bucket.is_empty() {
            bail!("Backend URL '{}' has no bucket", url);
        }

        let prefix = prefix.trim_matches('/');
        let region = query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == "region")
            .map(|(_, value)| value.to_string())
            .filter(|value| !value.is_empty());

        Ok(Self::S3(S3Location {
            url: url.to_string(),
            bucket: bucket.to_string(),
            prefix: (!prefix.is_empty()).then(|| prefix.to_string()),
            region,
        }))
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::S3(location) => f.write_str(&location.url),
            Self::Other(url) => f.write_str(url),
        }
    }
}

impl S3Location {
    fn key(&self, path: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}/{}", prefix, path),
            None => path.to_string(),
        }
    }

    /// Prefix under which Pulumi keeps the stack's lock objects.
    pub fn lock_prefix(&self, stack: &str) -> String {
        self.key(&format!(".pulumi/locks/{}/", stack))
    }

    pub fn config_backup_key(&self, stack: &str) -> String {
        self.key(&format!(".pulumi/config-backups/{}", stack))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s3(url: &str) -> S3Location {
        match Backend::parse(url).unwrap() {
            Backend::S3(location) => location,
            other => panic!("expected an S3 backend, got {:?}", other),
        }
    }

    #[test]
    fn bare_bucket() {
        let location = s3("s3://state-bucket");
        assert_eq!(location.bucket, "state-bucket");
        assert_eq!(location.prefix, None);
        assert_eq!(location.region, None);
        assert_eq!(location.lock_prefix("dev"), ".pulumi/locks/dev/");
        assert_eq!(location.config_backup_key("dev"), ".pulumi/config-backups/dev");
    }

    #[test]
    fn bucket_with_prefix_and_region() {
        let location = s3("s3://state-bucket/teams/platform/?region=eu-west-2&awssdk=v2");
        assert_eq!(location.bucket, "state-bucket");
        assert_eq!(location.prefix.as_deref(), Some("teams/platform"));
        assert_eq!(location.region.as_deref(), Some("eu-west-2"));
        assert_eq!(
            location.lock_prefix("dev"),
            "teams/platform/.pulumi/locks/dev/"
        );
        assert_eq!(
            location.config_backup_key("dev"),
            "teams/platform/.pulumi/config-backups/dev"
        );
    }

    #[test]
    fn non_s3_backends_are_opaque() {
        assert_eq!(
            Backend::parse("file://~/.pulumi").unwrap(),
            Backend::Other("file://~/.pulumi".to_string())
        );
        assert_eq!(
            Backend::parse("https://api.pulumi.com").unwrap(),
            Backend::Other("https://api.pulumi.com".to_string())
        );
        // Only the exact scheme counts.
        assert!(matches!(
            Backend::parse("s3bucket").unwrap(),
            Backend::Other(_)
        ));
    }

    #[test]
    fn empty_bucket_is_rejected() {
        assert!(Backend::parse("s3://").is_err());
        assert!(Backend::parse("s3:///prefix").is_err());
    }
}
