use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use iam_lib::ids::{
    UserIdentifier,
    GroupIdentifier,
    PolicyIdentifier,
    UserUid,
    GroupUid,
    PolicyUid,
    SessionUid,
};
use iam_lib::query::{Limit, Offset};
use rand::RngCore;
use uuid::Uuid;

use super::{Entity, Result, Store, StoreError};
use super::types::{
    User,
    UserPublicKey,
    NewUser,
    Group,
    NewGroup,
    Policy,
    PolicyUpdate,
    Session,
};

pub const SESSION_TOKEN_BYTES: usize = 32;

const TOKEN_ATTEMPTS: usize = 10;

#[derive(Debug, Clone)]
struct UserEntry {
    email: Option<String>,
    public_keys: Vec<UserPublicKey>,
}

#[derive(Debug, Clone)]
struct GroupEntry {
    name: Option<String>,
}

#[derive(Debug, Clone)]
struct SessionEntry {
    user: UserUid,
    token: String,
    expires: DateTime<Utc>,
}

/// the single state cell. every mapping in here is mutated under one
/// write-lock acquisition so readers never observe partial updates
#[derive(Debug, Default)]
struct State {
    users: HashMap<UserUid, UserEntry>,
    groups: HashMap<GroupUid, GroupEntry>,
    policies: HashMap<PolicyUid, Policy>,
    sessions: HashMap<SessionUid, SessionEntry>,
    session_tokens: HashMap<String, SessionUid>,

    memberships: HashSet<(UserUid, GroupUid)>,
    user_policies: HashSet<(UserUid, PolicyUid)>,
    group_policies: HashSet<(GroupUid, PolicyUid)>,

    emails: HashMap<String, UserUid>,
    group_names: HashMap<String, GroupUid>,
    policy_names: HashMap<String, PolicyUid>,
}

impl State {
    fn resolve_user(&self, id: &UserIdentifier) -> Option<UserUid> {
        match id {
            UserIdentifier::Uid(uid) |
            UserIdentifier::UidAndEmail(uid, _) => {
                self.users.contains_key(uid).then_some(*uid)
            },
            UserIdentifier::Email(email) => self.emails.get(email).copied(),
        }
    }

    fn resolve_group(&self, id: &GroupIdentifier) -> Option<GroupUid> {
        match id {
            GroupIdentifier::Gid(gid) |
            GroupIdentifier::GidAndName(gid, _) => {
                self.groups.contains_key(gid).then_some(*gid)
            },
            GroupIdentifier::Name(name) => self.group_names.get(name).copied(),
        }
    }

    fn resolve_policy(&self, id: &PolicyIdentifier) -> Option<PolicyUid> {
        match id {
            PolicyIdentifier::Pid(pid) |
            PolicyIdentifier::PidAndName(pid, _) => {
                self.policies.contains_key(pid).then_some(*pid)
            },
            PolicyIdentifier::Name(name) => self.policy_names.get(name).copied(),
        }
    }

    fn user_with_relations(&self, uid: &UserUid, entry: &UserEntry) -> User {
        let mut groups: Vec<GroupUid> = self.memberships.iter()
            .filter(|(member, _)| member == uid)
            .map(|(_, gid)| *gid)
            .collect();
        let mut policies: Vec<PolicyUid> = self.user_policies.iter()
            .filter(|(member, _)| member == uid)
            .map(|(_, pid)| *pid)
            .collect();

        groups.sort();
        policies.sort();

        User {
            uid: *uid,
            email: entry.email.clone(),
            public_keys: entry.public_keys.clone(),
            groups,
            policies,
        }
    }

    fn group_with_relations(&self, gid: &GroupUid, entry: &GroupEntry) -> Group {
        let mut users: Vec<UserUid> = self.memberships.iter()
            .filter(|(_, group)| group == gid)
            .map(|(uid, _)| *uid)
            .collect();
        let mut policies: Vec<PolicyUid> = self.group_policies.iter()
            .filter(|(group, _)| group == gid)
            .map(|(_, pid)| *pid)
            .collect();

        users.sort();
        policies.sort();

        Group {
            gid: *gid,
            name: entry.name.clone(),
            users,
            policies,
        }
    }

    fn session_value(sid: &SessionUid, entry: &SessionEntry) -> Session {
        Session {
            sid: *sid,
            user: entry.user,
            token: entry.token.clone(),
            expires: entry.expires,
        }
    }

    /// removes the session and its token index entry
    fn drop_session(&mut self, sid: &SessionUid) {
        if let Some(entry) = self.sessions.remove(sid) {
            self.session_tokens.remove(&entry.token);
        }
    }
}

fn page<T>(items: Vec<T>, offset: Offset, limit: Option<Limit>) -> Vec<T> {
    let limit = limit.unwrap_or_default();

    items.into_iter()
        .skip(limit.skip(offset))
        .take(limit.as_usize())
        .collect()
}

fn generate_token() -> Result<String> {
    let mut bytes = [0u8; SESSION_TOKEN_BYTES];

    rand::thread_rng().try_fill_bytes(&mut bytes)?;

    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// in-memory reference store. all state lives behind one lock, each
/// trait operation is one atomic transaction against it
#[derive(Debug)]
pub struct MemoryStore {
    cell: RwLock<State>,
    session_ttl: Duration,
}

impl MemoryStore {
    pub fn new(session_ttl: Duration) -> Self {
        MemoryStore {
            cell: RwLock::new(State::default()),
            session_ttl,
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>> {
        self.cell.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>> {
        self.cell.write().map_err(|_| StoreError::Poisoned)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_user(&self, id: &UserIdentifier) -> Result<User> {
        let state = self.read()?;

        let uid = state.resolve_user(id)
            .ok_or_else(|| StoreError::NotFound(Entity::User, id.to_string()))?;
        let entry = state.users.get(&uid)
            .expect("resolved user is missing from the primary map");

        Ok(state.user_with_relations(&uid, entry))
    }

    async fn get_user_uid(&self, id: &UserIdentifier) -> Result<UserUid> {
        let state = self.read()?;

        state.resolve_user(id)
            .ok_or_else(|| StoreError::NotFound(Entity::User, id.to_string()))
    }

    async fn list_users(&self, offset: Offset, limit: Option<Limit>) -> Result<Vec<User>> {
        let state = self.read()?;

        let mut uids: Vec<UserUid> = state.users.keys().copied().collect();
        uids.sort();

        let rtn = page(uids, offset, limit)
            .into_iter()
            .map(|uid| {
                let entry = state.users.get(&uid).unwrap();

                state.user_with_relations(&uid, entry)
            })
            .collect();

        Ok(rtn)
    }

    async fn create_user(&self, user: NewUser) -> Result<User> {
        let mut state = self.write()?;

        if state.users.contains_key(&user.uid) {
            return Err(StoreError::AlreadyExists(Entity::User, user.uid.to_string()));
        }

        if let Some(email) = &user.email {
            if state.emails.contains_key(email) {
                return Err(StoreError::AlreadyExists(Entity::User, email.clone()));
            }

            state.emails.insert(email.clone(), user.uid);
        }

        state.users.insert(user.uid, UserEntry {
            email: user.email,
            public_keys: user.public_keys,
        });

        let entry = state.users.get(&user.uid).unwrap().clone();

        Ok(state.user_with_relations(&user.uid, &entry))
    }

    async fn delete_user(&self, id: &UserIdentifier) -> Result<()> {
        let mut state = self.write()?;

        let uid = state.resolve_user(id)
            .ok_or_else(|| StoreError::NotFound(Entity::User, id.to_string()))?;

        let entry = state.users.remove(&uid).unwrap();

        if let Some(email) = entry.email {
            state.emails.remove(&email);
        }

        let sids: Vec<SessionUid> = state.sessions.iter()
            .filter(|(_, session)| session.user == uid)
            .map(|(sid, _)| *sid)
            .collect();

        for sid in sids {
            state.drop_session(&sid);
        }

        state.memberships.retain(|(member, _)| *member != uid);
        state.user_policies.retain(|(member, _)| *member != uid);

        Ok(())
    }

    async fn get_group(&self, id: &GroupIdentifier) -> Result<Group> {
        let state = self.read()?;

        let gid = state.resolve_group(id)
            .ok_or_else(|| StoreError::NotFound(Entity::Group, id.to_string()))?;
        let entry = state.groups.get(&gid)
            .expect("resolved group is missing from the primary map");

        Ok(state.group_with_relations(&gid, entry))
    }

    async fn list_groups(&self, offset: Offset, limit: Option<Limit>) -> Result<Vec<Group>> {
        let state = self.read()?;

        let mut gids: Vec<GroupUid> = state.groups.keys().copied().collect();
        gids.sort();

        let rtn = page(gids, offset, limit)
            .into_iter()
            .map(|gid| {
                let entry = state.groups.get(&gid).unwrap();

                state.group_with_relations(&gid, entry)
            })
            .collect();

        Ok(rtn)
    }

    async fn create_group(&self, group: NewGroup) -> Result<Group> {
        let mut state = self.write()?;

        if state.groups.contains_key(&group.gid) {
            return Err(StoreError::AlreadyExists(Entity::Group, group.gid.to_string()));
        }

        if let Some(name) = &group.name {
            if state.group_names.contains_key(name) {
                return Err(StoreError::AlreadyExists(Entity::Group, name.clone()));
            }

            state.group_names.insert(name.clone(), group.gid);
        }

        state.groups.insert(group.gid, GroupEntry {
            name: group.name,
        });

        let entry = state.groups.get(&group.gid).unwrap().clone();

        Ok(state.group_with_relations(&group.gid, &entry))
    }

    async fn delete_group(&self, id: &GroupIdentifier) -> Result<()> {
        let mut state = self.write()?;

        let gid = state.resolve_group(id)
            .ok_or_else(|| StoreError::NotFound(Entity::Group, id.to_string()))?;

        let entry = state.groups.remove(&gid).unwrap();

        if let Some(name) = entry.name {
            state.group_names.remove(&name);
        }

        state.memberships.retain(|(_, group)| *group != gid);
        state.group_policies.retain(|(group, _)| *group != gid);

        Ok(())
    }

    async fn get_policy(&self, id: &PolicyIdentifier) -> Result<Policy> {
        let state = self.read()?;

        let pid = state.resolve_policy(id)
            .ok_or_else(|| StoreError::NotFound(Entity::Policy, id.to_string()))?;

        Ok(state.policies.get(&pid).unwrap().clone())
    }

    async fn list_policies(&self, offset: Offset, limit: Option<Limit>) -> Result<Vec<Policy>> {
        let state = self.read()?;

        let mut pids: Vec<PolicyUid> = state.policies.keys().copied().collect();
        pids.sort();

        let rtn = page(pids, offset, limit)
            .into_iter()
            .map(|pid| state.policies.get(&pid).unwrap().clone())
            .collect();

        Ok(rtn)
    }

    async fn create_policy(&self, policy: Policy) -> Result<Policy> {
        let mut state = self.write()?;

        if state.policies.contains_key(&policy.pid) {
            return Err(StoreError::AlreadyExists(Entity::Policy, policy.pid.to_string()));
        }

        if let Some(name) = &policy.name {
            if state.policy_names.contains_key(name) {
                return Err(StoreError::AlreadyExists(Entity::Policy, name.clone()));
            }

            state.policy_names.insert(name.clone(), policy.pid);
        }

        state.policies.insert(policy.pid, policy.clone());

        Ok(policy)
    }

    async fn update_policy(&self, id: &PolicyIdentifier, update: PolicyUpdate) -> Result<Policy> {
        let mut state = self.write()?;

        let pid = state.resolve_policy(id)
            .ok_or_else(|| StoreError::NotFound(Entity::Policy, id.to_string()))?;

        if let Some(name) = &update.name {
            if let Some(found) = state.policy_names.get(name) {
                if *found != pid {
                    return Err(StoreError::AlreadyExists(Entity::Policy, name.clone()));
                }
            }
        }

        let policy = state.policies.get_mut(&pid).unwrap();

        let previous_name = if update.name.is_some() {
            policy.name.take()
        } else {
            None
        };

        if let Some(name) = update.name {
            policy.name = Some(name);
        }

        if let Some(hostname) = update.hostname {
            policy.hostname = hostname;
        }

        if let Some(rules) = update.rules {
            policy.rules = rules;
        }

        let rtn = policy.clone();

        if let Some(previous) = previous_name {
            state.policy_names.remove(&previous);
        }

        if let Some(name) = &rtn.name {
            state.policy_names.insert(name.clone(), pid);
        }

        Ok(rtn)
    }

    async fn delete_policy(&self, id: &PolicyIdentifier) -> Result<()> {
        let mut state = self.write()?;

        let pid = state.resolve_policy(id)
            .ok_or_else(|| StoreError::NotFound(Entity::Policy, id.to_string()))?;

        let policy = state.policies.remove(&pid).unwrap();

        if let Some(name) = policy.name {
            state.policy_names.remove(&name);
        }

        state.user_policies.retain(|(_, attached)| *attached != pid);
        state.group_policies.retain(|(_, attached)| *attached != pid);

        Ok(())
    }

    async fn list_policies_for_user(&self, uid: &UserUid, host: &str) -> Result<Vec<Policy>> {
        let state = self.read()?;

        if !state.users.contains_key(uid) {
            return Err(StoreError::NotFound(Entity::User, uid.to_string()));
        }

        let mut pids: HashSet<PolicyUid> = state.user_policies.iter()
            .filter(|(member, _)| member == uid)
            .map(|(_, pid)| *pid)
            .collect();

        for (member, gid) in &state.memberships {
            if member != uid {
                continue;
            }

            for (group, pid) in &state.group_policies {
                if group == gid {
                    pids.insert(*pid);
                }
            }
        }

        let mut pids: Vec<PolicyUid> = pids.into_iter().collect();
        pids.sort();

        let rtn = pids.into_iter()
            .filter_map(|pid| state.policies.get(&pid))
            .filter(|policy| policy.hostname == host)
            .cloned()
            .collect();

        Ok(rtn)
    }

    async fn create_membership(&self, user: &UserIdentifier, group: &GroupIdentifier) -> Result<()> {
        let mut state = self.write()?;

        let uid = state.resolve_user(user)
            .ok_or_else(|| StoreError::NotFound(Entity::User, user.to_string()))?;
        let gid = state.resolve_group(group)
            .ok_or_else(|| StoreError::NotFound(Entity::Group, group.to_string()))?;

        if !state.memberships.insert((uid, gid)) {
            return Err(StoreError::AlreadyExists(
                Entity::Membership,
                format!("{}/{}", uid, gid)
            ));
        }

        Ok(())
    }

    async fn delete_membership(&self, user: &UserIdentifier, group: &GroupIdentifier) -> Result<()> {
        let mut state = self.write()?;

        let uid = state.resolve_user(user)
            .ok_or_else(|| StoreError::NotFound(Entity::User, user.to_string()))?;
        let gid = state.resolve_group(group)
            .ok_or_else(|| StoreError::NotFound(Entity::Group, group.to_string()))?;

        if !state.memberships.remove(&(uid, gid)) {
            return Err(StoreError::NotFound(
                Entity::Membership,
                format!("{}/{}", uid, gid)
            ));
        }

        Ok(())
    }

    async fn create_user_policy_attachment(&self, user: &UserIdentifier, policy: &PolicyIdentifier) -> Result<()> {
        let mut state = self.write()?;

        let uid = state.resolve_user(user)
            .ok_or_else(|| StoreError::NotFound(Entity::User, user.to_string()))?;
        let pid = state.resolve_policy(policy)
            .ok_or_else(|| StoreError::NotFound(Entity::Policy, policy.to_string()))?;

        if !state.user_policies.insert((uid, pid)) {
            return Err(StoreError::AlreadyExists(
                Entity::Attachment,
                format!("{}/{}", uid, pid)
            ));
        }

        Ok(())
    }

    async fn delete_user_policy_attachment(&self, user: &UserIdentifier, policy: &PolicyIdentifier) -> Result<()> {
        let mut state = self.write()?;

        let uid = state.resolve_user(user)
            .ok_or_else(|| StoreError::NotFound(Entity::User, user.to_string()))?;
        let pid = state.resolve_policy(policy)
            .ok_or_else(|| StoreError::NotFound(Entity::Policy, policy.to_string()))?;

        if !state.user_policies.remove(&(uid, pid)) {
            return Err(StoreError::NotFound(
                Entity::Attachment,
                format!("{}/{}", uid, pid)
            ));
        }

        Ok(())
    }

    async fn create_group_policy_attachment(&self, group: &GroupIdentifier, policy: &PolicyIdentifier) -> Result<()> {
        let mut state = self.write()?;

        let gid = state.resolve_group(group)
            .ok_or_else(|| StoreError::NotFound(Entity::Group, group.to_string()))?;
        let pid = state.resolve_policy(policy)
            .ok_or_else(|| StoreError::NotFound(Entity::Policy, policy.to_string()))?;

        if !state.group_policies.insert((gid, pid)) {
            return Err(StoreError::AlreadyExists(
                Entity::Attachment,
                format!("{}/{}", gid, pid)
            ));
        }

        Ok(())
    }

    async fn delete_group_policy_attachment(&self, group: &GroupIdentifier, policy: &PolicyIdentifier) -> Result<()> {
        let mut state = self.write()?;

        let gid = state.resolve_group(group)
            .ok_or_else(|| StoreError::NotFound(Entity::Group, group.to_string()))?;
        let pid = state.resolve_policy(policy)
            .ok_or_else(|| StoreError::NotFound(Entity::Policy, policy.to_string()))?;

        if !state.group_policies.remove(&(gid, pid)) {
            return Err(StoreError::NotFound(
                Entity::Attachment,
                format!("{}/{}", gid, pid)
            ));
        }

        Ok(())
    }

    async fn create_session(&self, uid: &UserUid) -> Result<Session> {
        let mut attempts = TOKEN_ATTEMPTS;

        // token and ids are drawn outside the lock. only the final
        // install happens inside the critical section
        while attempts > 0 {
            let token = generate_token()?;
            let sid = Uuid::new_v4();
            let expires = Utc::now() + self.session_ttl;

            {
                let mut state = self.write()?;

                if !state.users.contains_key(uid) {
                    return Err(StoreError::NotFound(Entity::User, uid.to_string()));
                }

                if !state.session_tokens.contains_key(&token) {
                    state.sessions.insert(sid, SessionEntry {
                        user: *uid,
                        token: token.clone(),
                        expires,
                    });
                    state.session_tokens.insert(token.clone(), sid);

                    return Ok(Session {
                        sid,
                        user: *uid,
                        token,
                        expires,
                    });
                }
            }

            attempts -= 1;
        }

        Err(StoreError::TokenExists)
    }

    async fn get_session_by_id(&self, uid: &UserUid, sid: &SessionUid) -> Result<Session> {
        let mut state = self.write()?;

        let Some(entry) = state.sessions.get(sid) else {
            return Err(StoreError::NotFound(Entity::Session, sid.to_string()));
        };

        if Utc::now() >= entry.expires {
            state.drop_session(sid);

            return Err(StoreError::NotFound(Entity::Session, sid.to_string()));
        }

        if entry.user != *uid {
            return Err(StoreError::NotFound(Entity::Session, sid.to_string()));
        }

        Ok(State::session_value(sid, entry))
    }

    async fn get_session_by_token(&self, uid: &UserUid, token: &str) -> Result<Session> {
        let mut state = self.write()?;

        let Some(sid) = state.session_tokens.get(token).copied() else {
            return Err(StoreError::NotFound(Entity::Session, String::from("token")));
        };

        let entry = state.sessions.get(&sid)
            .expect("indexed session is missing from the primary map");

        if Utc::now() >= entry.expires {
            state.drop_session(&sid);

            return Err(StoreError::NotFound(Entity::Session, String::from("token")));
        }

        if entry.user != *uid {
            return Err(StoreError::NotFound(Entity::Session, String::from("token")));
        }

        Ok(State::session_value(&sid, entry))
    }

    async fn refresh_session(&self, uid: &UserUid, sid: &SessionUid) -> Result<Session> {
        let expires = Utc::now() + self.session_ttl;

        let mut state = self.write()?;

        let (expired, owner) = match state.sessions.get(sid) {
            Some(entry) => (Utc::now() >= entry.expires, entry.user),
            None => return Err(StoreError::NotFound(Entity::Session, sid.to_string())),
        };

        if expired {
            state.drop_session(sid);

            return Err(StoreError::NotFound(Entity::Session, sid.to_string()));
        }

        if owner != *uid {
            return Err(StoreError::NotFound(Entity::Session, sid.to_string()));
        }

        let entry = state.sessions.get_mut(sid).unwrap();

        entry.expires = expires;

        Ok(State::session_value(sid, entry))
    }

    async fn delete_session(&self, uid: &UserUid, sid: &SessionUid) -> Result<()> {
        let mut state = self.write()?;

        let Some(entry) = state.sessions.get(sid) else {
            return Err(StoreError::NotFound(Entity::Session, sid.to_string()));
        };

        if entry.user != *uid {
            return Err(StoreError::NotFound(Entity::Session, sid.to_string()));
        }

        state.drop_session(sid);

        Ok(())
    }

    async fn list_user_sessions(&self, uid: &UserUid, offset: Offset, limit: Option<Limit>) -> Result<Vec<Session>> {
        let mut state = self.write()?;

        if !state.users.contains_key(uid) {
            return Err(StoreError::NotFound(Entity::User, uid.to_string()));
        }

        let now = Utc::now();

        let expired: Vec<SessionUid> = state.sessions.iter()
            .filter(|(_, entry)| now >= entry.expires)
            .map(|(sid, _)| *sid)
            .collect();

        for sid in expired {
            state.drop_session(&sid);
        }

        let mut sessions: Vec<Session> = state.sessions.iter()
            .filter(|(_, entry)| entry.user == *uid)
            .map(|(sid, entry)| State::session_value(sid, entry))
            .collect();

        sessions.sort_by(|a, b| (a.expires, a.sid).cmp(&(b.expires, b.sid)));

        Ok(page(sessions, offset, limit))
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use super::*;

    fn store() -> MemoryStore {
        MemoryStore::new(Duration::seconds(60))
    }

    fn new_user(email: Option<&str>) -> NewUser {
        NewUser {
            uid: Uuid::new_v4(),
            email: email.map(str::to_owned),
            public_keys: Vec::new(),
        }
    }

    fn new_policy(name: Option<&str>, hostname: &str) -> Policy {
        Policy {
            pid: Uuid::new_v4(),
            name: name.map(str::to_owned),
            hostname: hostname.to_owned(),
            rules: Vec::new(),
        }
    }

    #[tokio::test]
    async fn create_get_user_by_uid_and_email() {
        let store = store();
        let created = store.create_user(new_user(Some("person@example.com"))).await.unwrap();

        let by_uid = store.get_user(&UserIdentifier::Uid(created.uid)).await.unwrap();
        let by_email = store.get_user(&UserIdentifier::Email(String::from("person@example.com"))).await.unwrap();

        assert_eq!(by_uid, created);
        assert_eq!(by_email, created);
    }

    #[tokio::test]
    async fn duplicate_email_rejected() {
        let store = store();

        store.create_user(new_user(Some("person@example.com"))).await.unwrap();

        match store.create_user(new_user(Some("person@example.com"))).await {
            Err(StoreError::AlreadyExists(Entity::User, _)) => {},
            other => panic!("expected already exists. {:#?}", other),
        }
    }

    #[tokio::test]
    async fn deleted_user_is_not_found() {
        let store = store();
        let created = store.create_user(new_user(Some("person@example.com"))).await.unwrap();

        store.delete_user(&UserIdentifier::Uid(created.uid)).await.unwrap();

        match store.get_user(&UserIdentifier::Uid(created.uid)).await {
            Err(StoreError::NotFound(Entity::User, _)) => {},
            other => panic!("expected not found. {:#?}", other),
        }

        // the email can be claimed again once the index entry is gone
        store.create_user(new_user(Some("person@example.com"))).await.unwrap();
    }

    #[tokio::test]
    async fn delete_user_cascades_sessions_and_relations() {
        let store = store();
        let user = store.create_user(new_user(None)).await.unwrap();
        let group = store.create_group(NewGroup {
            gid: Uuid::new_v4(),
            name: Some(String::from("operators")),
        }).await.unwrap();

        store.create_membership(
            &UserIdentifier::Uid(user.uid),
            &GroupIdentifier::Gid(group.gid)
        ).await.unwrap();

        let session = store.create_session(&user.uid).await.unwrap();

        store.delete_user(&UserIdentifier::Uid(user.uid)).await.unwrap();

        match store.get_session_by_id(&user.uid, &session.sid).await {
            Err(StoreError::NotFound(Entity::Session, _)) => {},
            other => panic!("expected orphaned session lookup to fail. {:#?}", other),
        }

        match store.get_session_by_token(&user.uid, &session.token).await {
            Err(StoreError::NotFound(Entity::Session, _)) => {},
            other => panic!("expected orphaned token lookup to fail. {:#?}", other),
        }

        let group = store.get_group(&GroupIdentifier::Gid(group.gid)).await.unwrap();

        assert!(group.users.is_empty(), "membership survived the user delete");
    }

    #[tokio::test]
    async fn membership_requires_both_endpoints() {
        let store = store();
        let user = store.create_user(new_user(None)).await.unwrap();

        match store.create_membership(
            &UserIdentifier::Uid(user.uid),
            &GroupIdentifier::Name(String::from("missing"))
        ).await {
            Err(StoreError::NotFound(Entity::Group, _)) => {},
            other => panic!("expected group not found. {:#?}", other),
        }
    }

    #[tokio::test]
    async fn duplicate_membership_rejected() {
        let store = store();
        let user = store.create_user(new_user(Some("person@example.com"))).await.unwrap();
        let group = store.create_group(NewGroup {
            gid: Uuid::new_v4(),
            name: Some(String::from("operators")),
        }).await.unwrap();

        store.create_membership(
            &UserIdentifier::Uid(user.uid),
            &GroupIdentifier::Gid(group.gid)
        ).await.unwrap();

        // the same pair through alias identifiers is still the same pair
        match store.create_membership(
            &UserIdentifier::Email(String::from("person@example.com")),
            &GroupIdentifier::Name(String::from("operators"))
        ).await {
            Err(StoreError::AlreadyExists(Entity::Membership, _)) => {},
            other => panic!("expected already exists. {:#?}", other),
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_membership_single_winner() {
        let store = Arc::new(store());
        let user = store.create_user(new_user(None)).await.unwrap();
        let group = store.create_group(NewGroup {
            gid: Uuid::new_v4(),
            name: None,
        }).await.unwrap();

        let mut handles = Vec::with_capacity(8);

        for _ in 0..8 {
            let store = Arc::clone(&store);
            let uid = user.uid;
            let gid = group.gid;

            handles.push(tokio::spawn(async move {
                store.create_membership(
                    &UserIdentifier::Uid(uid),
                    &GroupIdentifier::Gid(gid)
                ).await
            }));
        }

        let mut created = 0;
        let mut conflicts = 0;

        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => created += 1,
                Err(StoreError::AlreadyExists(Entity::Membership, _)) => conflicts += 1,
                other => panic!("unexpected result. {:#?}", other),
            }
        }

        assert_eq!(created, 1);
        assert_eq!(conflicts, 7);
    }

    #[tokio::test]
    async fn policy_alias_resolution_and_update() {
        let store = store();
        let created = store.create_policy(new_policy(Some("readers"), "iam.example.com")).await.unwrap();

        let by_name = store.get_policy(&PolicyIdentifier::Name(String::from("readers"))).await.unwrap();

        assert_eq!(by_name, created);

        store.update_policy(
            &PolicyIdentifier::Pid(created.pid),
            PolicyUpdate {
                name: Some(String::from("auditors")),
                ..PolicyUpdate::default()
            }
        ).await.unwrap();

        match store.get_policy(&PolicyIdentifier::Name(String::from("readers"))).await {
            Err(StoreError::NotFound(Entity::Policy, _)) => {},
            other => panic!("expected the old name to be unindexed. {:#?}", other),
        }

        let renamed = store.get_policy(&PolicyIdentifier::Name(String::from("auditors"))).await.unwrap();

        assert_eq!(renamed.pid, created.pid);
    }

    #[tokio::test]
    async fn update_policy_rejects_taken_name() {
        let store = store();

        store.create_policy(new_policy(Some("readers"), "iam.example.com")).await.unwrap();

        let other = store.create_policy(new_policy(Some("writers"), "iam.example.com")).await.unwrap();

        match store.update_policy(
            &PolicyIdentifier::Pid(other.pid),
            PolicyUpdate {
                name: Some(String::from("readers")),
                ..PolicyUpdate::default()
            }
        ).await {
            Err(StoreError::AlreadyExists(Entity::Policy, _)) => {},
            other => panic!("expected already exists. {:#?}", other),
        }
    }

    #[tokio::test]
    async fn policies_for_user_transitive_and_host_filtered() {
        let store = store();
        let user = store.create_user(new_user(None)).await.unwrap();
        let group = store.create_group(NewGroup {
            gid: Uuid::new_v4(),
            name: None,
        }).await.unwrap();

        let direct = store.create_policy(new_policy(Some("direct"), "iam.example.com")).await.unwrap();
        let via_group = store.create_policy(new_policy(Some("via-group"), "iam.example.com")).await.unwrap();
        let other_host = store.create_policy(new_policy(Some("elsewhere"), "other.example.com")).await.unwrap();

        store.create_membership(
            &UserIdentifier::Uid(user.uid),
            &GroupIdentifier::Gid(group.gid)
        ).await.unwrap();
        store.create_user_policy_attachment(
            &UserIdentifier::Uid(user.uid),
            &PolicyIdentifier::Pid(direct.pid)
        ).await.unwrap();
        store.create_group_policy_attachment(
            &GroupIdentifier::Gid(group.gid),
            &PolicyIdentifier::Pid(via_group.pid)
        ).await.unwrap();
        store.create_user_policy_attachment(
            &UserIdentifier::Uid(user.uid),
            &PolicyIdentifier::Pid(other_host.pid)
        ).await.unwrap();

        // attached both ways, must come back once
        store.create_group_policy_attachment(
            &GroupIdentifier::Gid(group.gid),
            &PolicyIdentifier::Pid(direct.pid)
        ).await.unwrap();

        let policies = store.list_policies_for_user(&user.uid, "iam.example.com").await.unwrap();
        let mut pids: Vec<PolicyUid> = policies.iter().map(|policy| policy.pid).collect();
        pids.sort();

        let mut expected = vec![direct.pid, via_group.pid];
        expected.sort();

        assert_eq!(pids, expected);
    }

    #[tokio::test]
    async fn session_cross_user_isolation() {
        let store = store();
        let owner = store.create_user(new_user(None)).await.unwrap();
        let other = store.create_user(new_user(None)).await.unwrap();

        let session = store.create_session(&owner.uid).await.unwrap();

        match store.get_session_by_id(&other.uid, &session.sid).await {
            Err(StoreError::NotFound(Entity::Session, _)) => {},
            result => panic!("expected not found. {:#?}", result),
        }

        match store.get_session_by_token(&other.uid, &session.token).await {
            Err(StoreError::NotFound(Entity::Session, _)) => {},
            result => panic!("expected not found. {:#?}", result),
        }

        store.get_session_by_id(&owner.uid, &session.sid).await.unwrap();
    }

    #[tokio::test]
    async fn expired_session_is_not_found() {
        let store = MemoryStore::new(Duration::zero());
        let user = store.create_user(new_user(None)).await.unwrap();

        let session = store.create_session(&user.uid).await.unwrap();

        match store.get_session_by_token(&user.uid, &session.token).await {
            Err(StoreError::NotFound(Entity::Session, _)) => {},
            result => panic!("expected not found. {:#?}", result),
        }

        let sessions = store.list_user_sessions(&user.uid, 0, None).await.unwrap();

        assert!(sessions.is_empty(), "expired session survived the sweep");
    }

    #[tokio::test]
    async fn refresh_extends_expiry() {
        let store = store();
        let user = store.create_user(new_user(None)).await.unwrap();

        let session = store.create_session(&user.uid).await.unwrap();
        let refreshed = store.refresh_session(&user.uid, &session.sid).await.unwrap();

        assert!(refreshed.expires >= session.expires);

        match store.refresh_session(&Uuid::new_v4(), &session.sid).await {
            Err(StoreError::NotFound(Entity::Session, _)) => {},
            result => panic!("expected not found for a foreign refresh. {:#?}", result),
        }
    }

    #[tokio::test]
    async fn session_tokens_are_distinct() {
        let store = store();
        let user = store.create_user(new_user(None)).await.unwrap();

        let first = store.create_session(&user.uid).await.unwrap();
        let second = store.create_session(&user.uid).await.unwrap();

        assert_ne!(first.token, second.token);
        assert_ne!(first.sid, second.sid);

        let sessions = store.list_user_sessions(&user.uid, 0, None).await.unwrap();

        assert_eq!(sessions.len(), 2);
    }
}
