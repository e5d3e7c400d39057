//! Common test utilities for gdeb integration tests

use std::fs;
use std::path::{Path, PathBuf};

use git2::{BranchType, Oid, Repository, Signature, build::CheckoutBuilder};
use tempfile::TempDir;

pub const CHANGELOG: &str = "foo (1.2-3) unstable; urgency=medium\n\n  * Initial packaging.\n\n -- Test <test@test.com>  Mon, 01 Jan 2024 00:00:00 +0000\n";

/// A scratch repository at `<temp>/repo`; archives land in `<temp>`
pub struct TestRepo {
    /// Temporary directory holding the repository and its archives
    pub temp: TempDir,
    /// Working-tree root
    pub path: PathBuf,
    pub repo: Repository,
}

#[allow(dead_code)]
impl TestRepo {
    /// Repository on `master` with one commit containing `README`
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().join("repo");
        fs::create_dir_all(&path).expect("Failed to create repository directory");

        let repo = Repository::init(&path).expect("Failed to init repository");
        repo.set_head("refs/heads/master")
            .expect("Failed to point HEAD at master");

        let test_repo = Self { temp, path, repo };
        test_repo.commit(&[("README", "upstream\n")], "Initial commit");
        test_repo
    }

    /// The standard layout: `a` on `master` at the fork point, packaging and
    /// `feature-only` on `feature`, then `b` on `master`. Ends on `feature`.
    pub fn packaged() -> Self {
        let test_repo = Self::new();
        test_repo.commit(&[("a", "alpha\n")], "Upstream release");
        test_repo.create_branch("feature");
        test_repo.commit(
            &[
                ("debian/control", "Source: foo\n"),
                ("debian/changelog", CHANGELOG),
                ("feature-only", "packaging branch\n"),
            ],
            "Add packaging",
        );
        test_repo.switch("master");
        test_repo.commit(&[("b", "beta\n")], "Upstream moves on");
        test_repo.switch("feature");
        test_repo
    }

    /// Write `files` and commit them on the current branch
    pub fn commit(&self, files: &[(&str, &str)], message: &str) -> Oid {
        let mut index = self.repo.index().expect("Failed to open index");
        for (path, content) in files {
            self.write_file(path, content);
            index
                .add_path(Path::new(path))
                .expect("Failed to stage file");
        }
        index.write().expect("Failed to write index");

        let tree = self
            .repo
            .find_tree(index.write_tree().expect("Failed to write tree"))
            .expect("Failed to find tree");
        let sig = Signature::now("Test", "test@test.com").expect("Failed to create signature");
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to commit")
    }

    /// Create `name` at HEAD and switch to it
    pub fn create_branch(&self, name: &str) {
        let head = self
            .repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .expect("Failed to read HEAD");
        self.repo
            .branch(name, &head, false)
            .expect("Failed to create branch");
        self.switch(name);
    }

    /// Force-switch to branch `name`
    pub fn switch(&self, name: &str) {
        let refname = format!("refs/heads/{name}");
        let target = self
            .repo
            .revparse_single(&refname)
            .expect("Failed to resolve branch");
        self.repo
            .checkout_tree(&target, Some(CheckoutBuilder::new().force()))
            .expect("Failed to checkout");
        self.repo.set_head(&refname).expect("Failed to move HEAD");
    }

    /// Detach HEAD at `oid`, checking out its tree
    pub fn detach_at(&self, oid: Oid) {
        let commit = self.repo.find_commit(oid).expect("Failed to find commit");
        self.repo
            .checkout_tree(commit.as_object(), Some(CheckoutBuilder::new().force()))
            .expect("Failed to checkout");
        self.repo.set_head_detached(oid).expect("Failed to detach HEAD");
    }

    /// Short name of the checked-out branch, `None` when detached
    pub fn current_branch(&self) -> Option<String> {
        self.repo
            .branches(Some(BranchType::Local))
            .expect("Failed to list branches")
            .filter_map(Result::ok)
            .find(|(branch, _)| branch.is_head())
            .and_then(|(branch, _)| branch.name().ok().flatten().map(str::to_string))
    }

    /// Merge-base of `feature` and `master`
    pub fn fork_point(&self) -> Oid {
        let resolve = |name: &str| {
            self.repo
                .revparse_single(&format!("refs/heads/{name}"))
                .expect("Failed to resolve branch")
                .id()
        };
        self.repo
            .merge_base(resolve("feature"), resolve("master"))
            .expect("Failed to compute merge-base")
    }

    /// Write a file in the working tree
    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Directory archives are written to
    pub fn output_dir(&self) -> PathBuf {
        self.temp.path().to_path_buf()
    }

    pub fn marker_path(&self) -> PathBuf {
        self.repo.path().join("gdeb-restore")
    }

    /// Paths inside a gzip-compressed tar archive
    pub fn archive_entries(archive: &Path) -> Vec<String> {
        let file = fs::File::open(archive).expect("Failed to open archive");
        let mut tar = tar::Archive::new(flate2::read::GzDecoder::new(file));
        tar.entries()
            .expect("Failed to read archive")
            .map(|entry| {
                entry
                    .expect("Failed to read entry")
                    .path()
                    .expect("Entry without path")
                    .to_string_lossy()
                    .into_owned()
            })
            .collect()
    }
}
