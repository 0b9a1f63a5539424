//! In-memory directory for tests and single-process deployments.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock};

use crate::directory::{
    domain::{Member, MemberId, Tag, TagId, Tagging, TaggingId, WorkerProfile},
    ports::{DirectoryRepositoryError, DirectoryResult, MemberDirectory},
};

/// Thread-safe in-memory member directory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    state: Arc<RwLock<DirectoryState>>,
}

#[derive(Debug, Default)]
struct DirectoryState {
    members: HashMap<MemberId, Member>,
    profiles: HashMap<MemberId, WorkerProfile>,
    tags: HashMap<TagId, Tag>,
    tag_names: HashMap<String, TagId>,
    taggings: HashMap<TaggingId, Tagging>,
    tagging_index: HashMap<(MemberId, TagId), TaggingId>,
}

impl InMemoryDirectory {
    /// Creates an empty in-memory directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read_state(
        &self,
    ) -> DirectoryResult<std::sync::RwLockReadGuard<'_, DirectoryState>> {
        self.state.read().map_err(|err| {
            DirectoryRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write_state(
        &self,
    ) -> DirectoryResult<std::sync::RwLockWriteGuard<'_, DirectoryState>> {
        self.state.write().map_err(|err| {
            DirectoryRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

#[async_trait]
impl MemberDirectory for InMemoryDirectory {
    async fn store_member(&self, member: &Member) -> DirectoryResult<()> {
        let mut state = self.write_state()?;
        if state.members.contains_key(&member.id()) {
            return Err(DirectoryRepositoryError::DuplicateMember(member.id()));
        }
        state
            .profiles
            .insert(member.id(), WorkerProfile::new(member.id()));
        state.members.insert(member.id(), member.clone());
        Ok(())
    }

    async fn find_member(&self, id: MemberId) -> DirectoryResult<Option<Member>> {
        let state = self.read_state()?;
        Ok(state.members.get(&id).cloned())
    }

    async fn members_with_tag(&self, tag: TagId) -> DirectoryResult<BTreeSet<MemberId>> {
        let state = self.read_state()?;
        Ok(state
            .taggings
            .values()
            .filter(|tagging| tagging.tag == tag)
            .map(|tagging| tagging.member)
            .collect())
    }

    async fn members_without_email(&self) -> DirectoryResult<BTreeSet<MemberId>> {
        let state = self.read_state()?;
        Ok(state
            .members
            .values()
            .filter(|member| member.email().is_none())
            .map(Member::id)
            .collect())
    }

    async fn inactive_members(&self) -> DirectoryResult<BTreeSet<MemberId>> {
        let state = self.read_state()?;
        Ok(state
            .members
            .values()
            .filter(|member| !member.is_active())
            .map(Member::id)
            .collect())
    }

    async fn members_with_nagging_disabled(&self) -> DirectoryResult<BTreeSet<MemberId>> {
        let state = self.read_state()?;
        Ok(state
            .profiles
            .values()
            .filter(|profile| !profile.should_nag)
            .map(|profile| profile.member)
            .collect())
    }

    async fn worker_profile(&self, member: MemberId) -> DirectoryResult<WorkerProfile> {
        let state = self.read_state()?;
        state
            .profiles
            .get(&member)
            .copied()
            .ok_or(DirectoryRepositoryError::MemberNotFound(member))
    }

    async fn update_worker_profile(&self, profile: WorkerProfile) -> DirectoryResult<()> {
        let mut state = self.write_state()?;
        if !state.members.contains_key(&profile.member) {
            return Err(DirectoryRepositoryError::MemberNotFound(profile.member));
        }
        state.profiles.insert(profile.member, profile);
        Ok(())
    }

    async fn store_tag(&self, tag: &Tag) -> DirectoryResult<()> {
        let mut state = self.write_state()?;
        if state.tag_names.contains_key(tag.name()) {
            return Err(DirectoryRepositoryError::DuplicateTagName(
                tag.name().to_owned(),
            ));
        }
        state.tag_names.insert(tag.name().to_owned(), tag.id());
        state.tags.insert(tag.id(), tag.clone());
        Ok(())
    }

    async fn find_tag(&self, id: TagId) -> DirectoryResult<Option<Tag>> {
        let state = self.read_state()?;
        Ok(state.tags.get(&id).cloned())
    }

    async fn store_tagging(&self, tagging: &Tagging) -> DirectoryResult<()> {
        let mut state = self.write_state()?;
        let key = (tagging.member, tagging.tag);
        if state.tagging_index.contains_key(&key) {
            return Err(DirectoryRepositoryError::DuplicateTagging {
                member: tagging.member,
                tag: tagging.tag,
            });
        }
        state.tagging_index.insert(key, tagging.id);
        state.taggings.insert(tagging.id, tagging.clone());
        Ok(())
    }

    async fn remove_tagging(&self, member: MemberId, tag: TagId) -> DirectoryResult<bool> {
        let mut state = self.write_state()?;
        let Some(tagging_id) = state.tagging_index.remove(&(member, tag)) else {
            return Ok(false);
        };
        state.taggings.remove(&tagging_id);
        Ok(true)
    }

    async fn taggings_for_member(&self, member: MemberId) -> DirectoryResult<Vec<Tagging>> {
        let state = self.read_state()?;
        Ok(state
            .taggings
            .values()
            .filter(|tagging| tagging.member == member)
            .cloned()
            .collect())
    }

    async fn taggings_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DirectoryResult<Vec<Tagging>> {
        let state = self.read_state()?;
        Ok(state
            .taggings
            .values()
            .filter(|tagging| tagging.date_tagged >= start && tagging.date_tagged < end)
            .cloned()
            .collect())
    }
}
