use crate::domain::value_objects::{PostId, RelationshipId, UserId};
use crate::ports::read_store::{
    PostView, ReadStore as ReadStoreTrait, Result, Tunables, UserProfile,
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

/// In-memory implementation of ReadStore
///
/// All projections live in one state struct behind a single mutex, so
/// every operation is atomic with respect to every other one. The whole
/// content is derived data and can be rebuilt from the event log.
pub struct MemoryReadStore {
    tunables: Tunables,
    state: Mutex<ReadState>,
}

#[derive(Default)]
struct ReadState {
    profiles: HashMap<UserId, UserProfile>,
    username_index: HashMap<String, UserId>,
    posts: HashMap<PostId, PostView>,
    /// Per-author post ids in publish order (oldest first).
    author_posts: HashMap<UserId, Vec<PostId>>,
    /// Twin indices of the follow graph. The graph may contain cycles;
    /// each index owns its own storage and mutations update both.
    outgoing: HashMap<UserId, HashSet<UserId>>,
    incoming: HashMap<UserId, HashSet<UserId>>,
    relationships: HashMap<(UserId, UserId), RelationshipId>,
    /// Per-user timelines, newest first, bounded by `max_timeline`.
    timelines: HashMap<UserId, VecDeque<PostId>>,
    /// Posts published while their author was a celebrity.
    celebrity_posts: HashMap<PostId, UserId>,
}

impl MemoryReadStore {
    pub fn new(tunables: Tunables) -> Self {
        Self {
            tunables,
            state: Mutex::new(ReadState::default()),
        }
    }

    pub fn tunables(&self) -> Tunables {
        self.tunables
    }
}

impl Default for MemoryReadStore {
    fn default() -> Self {
        Self::new(Tunables::default())
    }
}

#[async_trait]
impl ReadStoreTrait for MemoryReadStore {
    async fn save_profile(&self, profile: UserProfile) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state
            .username_index
            .insert(profile.username.as_str().to_string(), profile.user_id);
        state.profiles.insert(profile.user_id, profile);
        Ok(())
    }

    async fn get_profile(&self, user_id: UserId) -> Result<Option<UserProfile>> {
        let state = self.state.lock().unwrap();
        Ok(state.profiles.get(&user_id).cloned())
    }

    async fn find_profile_by_username(&self, username: &str) -> Result<Option<UserProfile>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .username_index
            .get(username)
            .and_then(|user_id| state.profiles.get(user_id))
            .cloned())
    }

    async fn list_profiles(&self) -> Result<Vec<UserProfile>> {
        let state = self.state.lock().unwrap();
        let mut profiles: Vec<_> = state.profiles.values().cloned().collect();
        profiles.sort_by(|a, b| a.username.as_str().cmp(b.username.as_str()));
        Ok(profiles)
    }

    async fn save_post(&self, post: PostView) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let author_entry = state.author_posts.entry(post.author_id).or_default();
        if !author_entry.contains(&post.post_id) {
            author_entry.push(post.post_id);
        }
        state.posts.insert(post.post_id, post);
        Ok(())
    }

    async fn get_post(&self, post_id: PostId) -> Result<Option<PostView>> {
        let state = self.state.lock().unwrap();
        Ok(state.posts.get(&post_id).cloned())
    }

    async fn delete_post(&self, post_id: PostId) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(post) = state.posts.remove(&post_id) {
            if let Some(author_entry) = state.author_posts.get_mut(&post.author_id) {
                author_entry.retain(|id| *id != post_id);
            }
        }
        Ok(())
    }

    async fn list_posts_by_author(&self, author_id: UserId) -> Result<Vec<PostView>> {
        let state = self.state.lock().unwrap();
        let ids = match state.author_posts.get(&author_id) {
            Some(ids) => ids,
            None => return Ok(Vec::new()),
        };

        // Publish order is oldest first; reverse for newest first.
        Ok(ids
            .iter()
            .rev()
            .filter_map(|id| state.posts.get(id))
            .cloned()
            .collect())
    }

    async fn add_edge(
        &self,
        follower_id: UserId,
        followee_id: UserId,
        relationship_id: RelationshipId,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state
            .outgoing
            .entry(follower_id)
            .or_default()
            .insert(followee_id);
        state
            .incoming
            .entry(followee_id)
            .or_default()
            .insert(follower_id);
        state
            .relationships
            .insert((follower_id, followee_id), relationship_id);
        Ok(())
    }

    async fn remove_edge(&self, follower_id: UserId, followee_id: UserId) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(set) = state.outgoing.get_mut(&follower_id) {
            set.remove(&followee_id);
        }
        if let Some(set) = state.incoming.get_mut(&followee_id) {
            set.remove(&follower_id);
        }
        state.relationships.remove(&(follower_id, followee_id));
        Ok(())
    }

    async fn outgoing(&self, user_id: UserId) -> Result<Vec<UserId>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .outgoing
            .get(&user_id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default())
    }

    async fn incoming(&self, user_id: UserId) -> Result<Vec<UserId>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .incoming
            .get(&user_id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default())
    }

    async fn is_following(&self, follower_id: UserId, followee_id: UserId) -> Result<bool> {
        let state = self.state.lock().unwrap();
        Ok(state
            .outgoing
            .get(&follower_id)
            .map(|set| set.contains(&followee_id))
            .unwrap_or(false))
    }

    async fn relationship_of(
        &self,
        follower_id: UserId,
        followee_id: UserId,
    ) -> Result<Option<RelationshipId>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .relationships
            .get(&(follower_id, followee_id))
            .copied())
    }

    async fn push_timeline(&self, owner_id: UserId, post_id: PostId) -> Result<()> {
        let max_timeline = self.tunables.max_timeline;
        let mut state = self.state.lock().unwrap();
        let timeline = state.timelines.entry(owner_id).or_default();
        timeline.push_front(post_id);
        timeline.truncate(max_timeline);
        Ok(())
    }

    async fn remove_from_timeline(&self, owner_id: UserId, post_id: PostId) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(timeline) = state.timelines.get_mut(&owner_id) {
            timeline.retain(|id| *id != post_id);
        }
        Ok(())
    }

    async fn remove_author_from_timeline(
        &self,
        owner_id: UserId,
        author_id: UserId,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let ReadState {
            timelines, posts, ..
        } = &mut *state;
        if let Some(timeline) = timelines.get_mut(&owner_id) {
            // Entries whose post no longer resolves are dropped as well.
            timeline.retain(|id| {
                posts
                    .get(id)
                    .map(|post| post.author_id != author_id)
                    .unwrap_or(false)
            });
        }
        Ok(())
    }

    async fn get_timeline(&self, owner_id: UserId) -> Result<Vec<PostId>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .timelines
            .get(&owner_id)
            .map(|timeline| timeline.iter().copied().collect())
            .unwrap_or_default())
    }

    async fn mark_celebrity_post(&self, post_id: PostId, author_id: UserId) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.celebrity_posts.insert(post_id, author_id);
        Ok(())
    }

    async fn forget_celebrity_post(&self, post_id: PostId) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.celebrity_posts.remove(&post_id);
        Ok(())
    }

    async fn celebrity_posts_of(&self, author_ids: &[UserId]) -> Result<Vec<PostId>> {
        let state = self.state.lock().unwrap();
        let authors: HashSet<UserId> = author_ids.iter().copied().collect();
        Ok(state
            .celebrity_posts
            .iter()
            .filter(|(_, author_id)| authors.contains(author_id))
            .map(|(post_id, _)| *post_id)
            .collect())
    }

    async fn is_celebrity(&self, user_id: UserId) -> Result<bool> {
        let state = self.state.lock().unwrap();
        let follower_count = state
            .incoming
            .get(&user_id)
            .map(|set| set.len())
            .unwrap_or(0);
        Ok(follower_count >= self.tunables.celebrity_threshold)
    }
}
