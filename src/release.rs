//! Container image naming for the build pipeline.
//!
//! Images are pushed as `<registry-host>/<project>/<repository>/<image-name>:<tag>`,
//! where the tag is the commit SHA the image was built from.

use crate::utils::error::{NewsError, Result};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Port the container exposes and the HTTP transport binds by default.
pub const DEFAULT_PORT: u16 = 8080;

pub const DEFAULT_IMAGE_NAME: &str = "news-context-analyzer";

static HOST_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9.-]*[A-Za-z0-9])?(:[0-9]{1,5})?$")
        .expect("host pattern is valid")
});
static PATH_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]+(?:[._-][a-z0-9]+)*$").expect("path pattern is valid")
});
static TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_.-]{0,127}$").expect("tag pattern is valid")
});
static COMMIT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-fA-F]{7,40}$").expect("commit pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub registry_host: String,
    pub project: String,
    pub repository: String,
    pub image_name: String,
    pub tag: String,
}

impl ImageRef {
    pub fn new(
        registry_host: impl Into<String>,
        project: impl Into<String>,
        repository: impl Into<String>,
        image_name: impl Into<String>,
        tag: impl Into<String>,
    ) -> Result<Self> {
        let image = Self {
            registry_host: registry_host.into(),
            project: project.into(),
            repository: repository.into(),
            image_name: image_name.into(),
            tag: tag.into(),
        };

        check("registry_host", &image.registry_host, &HOST_PATTERN)?;
        check("project", &image.project, &PATH_PATTERN)?;
        check("repository", &image.repository, &PATH_PATTERN)?;
        check("image_name", &image.image_name, &PATH_PATTERN)?;
        check("tag", &image.tag, &TAG_PATTERN)?;
        Ok(image)
    }

    /// Commit-derived tag: the tag is the lowercased revision hash.
    pub fn from_commit(
        registry_host: impl Into<String>,
        project: impl Into<String>,
        repository: impl Into<String>,
        image_name: impl Into<String>,
        commit_sha: &str,
    ) -> Result<Self> {
        let commit_sha = commit_sha.trim();
        check("commit_sha", commit_sha, &COMMIT_PATTERN)?;
        Self::new(
            registry_host,
            project,
            repository,
            image_name,
            commit_sha.to_ascii_lowercase(),
        )
    }

    /// Reference without the tag, as used for `docker push --all-tags`.
    pub fn repository_path(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.registry_host, self.project, self.repository, self.image_name
        )
    }
}

fn check(field: &str, value: &str, pattern: &Regex) -> Result<()> {
    if pattern.is_match(value) {
        return Ok(());
    }
    Err(NewsError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: format!("must match {}", pattern.as_str()),
    })
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository_path(), self.tag)
    }
}

impl FromStr for ImageRef {
    type Err = NewsError;

    fn from_str(s: &str) -> Result<Self> {
        let malformed = || NewsError::InvalidConfigValueError {
            field: "image".to_string(),
            value: s.to_string(),
            reason: "expected <registry-host>/<project>/<repository>/<image-name>:<tag>"
                .to_string(),
        };

        let (path, name_and_tag) = s.rsplit_once('/').ok_or_else(malformed)?;
        let (image_name, tag) = name_and_tag.split_once(':').ok_or_else(malformed)?;

        let segments: Vec<&str> = path.split('/').collect();
        let [registry_host, project, repository] = segments.as_slice() else {
            return Err(malformed());
        };

        Self::new(*registry_host, *project, *repository, image_name, tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHA: &str = "3f2a9c41d0be7e8a1c5d6f7081920a3b4c5d6e7f";

    #[test]
    fn test_commit_tagged_reference() {
        let image = ImageRef::from_commit(
            "asia-northeast3-docker.pkg.dev",
            "news-project",
            "containers",
            DEFAULT_IMAGE_NAME,
            SHA,
        )
        .unwrap();

        assert_eq!(
            image.to_string(),
            format!(
                "asia-northeast3-docker.pkg.dev/news-project/containers/news-context-analyzer:{}",
                SHA
            )
        );
    }

    #[test]
    fn test_commit_sha_is_lowercased_and_checked() {
        let image = ImageRef::from_commit("gcr.io", "p", "r", "img", "ABCDEF1").unwrap();
        assert_eq!(image.tag, "abcdef1");

        assert!(ImageRef::from_commit("gcr.io", "p", "r", "img", "abc").is_err());
        assert!(ImageRef::from_commit("gcr.io", "p", "r", "img", "not-a-sha!").is_err());
    }

    #[test]
    fn test_parse_reference() {
        let parsed: ImageRef = "localhost:5000/proj/repo/app:v1.2".parse().unwrap();
        assert_eq!(parsed.registry_host, "localhost:5000");
        assert_eq!(parsed.project, "proj");
        assert_eq!(parsed.repository, "repo");
        assert_eq!(parsed.image_name, "app");
        assert_eq!(parsed.tag, "v1.2");
        assert_eq!(parsed.to_string(), "localhost:5000/proj/repo/app:v1.2");
    }

    #[test]
    fn test_parse_rejects_wrong_shape() {
        assert!("gcr.io/proj/app:tag".parse::<ImageRef>().is_err());
        assert!("gcr.io/proj/repo/app".parse::<ImageRef>().is_err());
        assert!("gcr.io/proj/repo/extra/app:tag".parse::<ImageRef>().is_err());
        assert!("gcr.io/Proj/repo/app:tag".parse::<ImageRef>().is_err());
    }
}
