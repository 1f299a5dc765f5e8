use std::fmt;

use uuid::Uuid;

pub type UserUid = Uuid;
pub type GroupUid = Uuid;
pub type PolicyUid = Uuid;
pub type SessionUid = Uuid;

/// reference to a user by uuid, by email, or by both. when both are
/// present the uuid is authoritative
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserIdentifier {
    Uid(UserUid),
    Email(String),
    UidAndEmail(UserUid, String),
}

impl UserIdentifier {
    /// anything that parses as a uuid is treated as a uid, everything
    /// else is an email
    pub fn parse<G>(given: G) -> Self
    where
        G: AsRef<str>
    {
        let given_ref = given.as_ref();

        match Uuid::parse_str(given_ref) {
            Ok(uid) => UserIdentifier::Uid(uid),
            Err(_) => UserIdentifier::Email(given_ref.to_owned()),
        }
    }

    pub fn uid(&self) -> Option<&UserUid> {
        match self {
            UserIdentifier::Uid(uid) |
            UserIdentifier::UidAndEmail(uid, _) => Some(uid),
            UserIdentifier::Email(_) => None,
        }
    }

    pub fn email(&self) -> Option<&str> {
        match self {
            UserIdentifier::Email(email) |
            UserIdentifier::UidAndEmail(_, email) => Some(email.as_str()),
            UserIdentifier::Uid(_) => None,
        }
    }
}

impl From<UserUid> for UserIdentifier {
    fn from(uid: UserUid) -> Self {
        UserIdentifier::Uid(uid)
    }
}

impl fmt::Display for UserIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserIdentifier::Uid(uid) => write!(f, "{}", uid),
            UserIdentifier::Email(email) => write!(f, "{}", email),
            UserIdentifier::UidAndEmail(uid, email) => write!(f, "{} ({})", uid, email),
        }
    }
}

/// reference to a group by uuid, by name, or by both
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupIdentifier {
    Gid(GroupUid),
    Name(String),
    GidAndName(GroupUid, String),
}

impl GroupIdentifier {
    pub fn parse<G>(given: G) -> Self
    where
        G: AsRef<str>
    {
        let given_ref = given.as_ref();

        match Uuid::parse_str(given_ref) {
            Ok(gid) => GroupIdentifier::Gid(gid),
            Err(_) => GroupIdentifier::Name(given_ref.to_owned()),
        }
    }

    pub fn gid(&self) -> Option<&GroupUid> {
        match self {
            GroupIdentifier::Gid(gid) |
            GroupIdentifier::GidAndName(gid, _) => Some(gid),
            GroupIdentifier::Name(_) => None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            GroupIdentifier::Name(name) |
            GroupIdentifier::GidAndName(_, name) => Some(name.as_str()),
            GroupIdentifier::Gid(_) => None,
        }
    }
}

impl From<GroupUid> for GroupIdentifier {
    fn from(gid: GroupUid) -> Self {
        GroupIdentifier::Gid(gid)
    }
}

impl fmt::Display for GroupIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupIdentifier::Gid(gid) => write!(f, "{}", gid),
            GroupIdentifier::Name(name) => write!(f, "{}", name),
            GroupIdentifier::GidAndName(gid, name) => write!(f, "{} ({})", gid, name),
        }
    }
}

/// reference to a policy by uuid, by name, or by both
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyIdentifier {
    Pid(PolicyUid),
    Name(String),
    PidAndName(PolicyUid, String),
}

impl PolicyIdentifier {
    pub fn parse<G>(given: G) -> Self
    where
        G: AsRef<str>
    {
        let given_ref = given.as_ref();

        match Uuid::parse_str(given_ref) {
            Ok(pid) => PolicyIdentifier::Pid(pid),
            Err(_) => PolicyIdentifier::Name(given_ref.to_owned()),
        }
    }

    pub fn pid(&self) -> Option<&PolicyUid> {
        match self {
            PolicyIdentifier::Pid(pid) |
            PolicyIdentifier::PidAndName(pid, _) => Some(pid),
            PolicyIdentifier::Name(_) => None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            PolicyIdentifier::Name(name) |
            PolicyIdentifier::PidAndName(_, name) => Some(name.as_str()),
            PolicyIdentifier::Pid(_) => None,
        }
    }
}

impl From<PolicyUid> for PolicyIdentifier {
    fn from(pid: PolicyUid) -> Self {
        PolicyIdentifier::Pid(pid)
    }
}

impl fmt::Display for PolicyIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyIdentifier::Pid(pid) => write!(f, "{}", pid),
            PolicyIdentifier::Name(name) => write!(f, "{}", name),
            PolicyIdentifier::PidAndName(pid, name) => write!(f, "{} ({})", pid, name),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    pub fn parse_uuid_text_is_uid() {
        let given = "11111111-1111-1111-1111-111111111111";

        match UserIdentifier::parse(given) {
            UserIdentifier::Uid(uid) => assert_eq!(uid.to_string(), given),
            other => panic!("expected uid variant. {:#?}", other),
        }
    }

    #[test]
    pub fn parse_non_uuid_text_is_alias() {
        match UserIdentifier::parse("person@example.com") {
            UserIdentifier::Email(email) => assert_eq!(email, "person@example.com"),
            other => panic!("expected email variant. {:#?}", other),
        }

        match GroupIdentifier::parse("operators") {
            GroupIdentifier::Name(name) => assert_eq!(name, "operators"),
            other => panic!("expected name variant. {:#?}", other),
        }
    }

    #[test]
    pub fn uid_wins_over_alias() {
        let uid = Uuid::new_v4();
        let ident = UserIdentifier::UidAndEmail(uid, String::from("person@example.com"));

        assert_eq!(ident.uid(), Some(&uid));
        assert_eq!(ident.email(), Some("person@example.com"));
    }
}
