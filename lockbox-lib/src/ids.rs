use uuid::Uuid;

pub type UserId = Uuid;
pub type GroupId = Uuid;
pub type GroupUserId = Uuid;
pub type RoleId = Uuid;
pub type EmailId = Uuid;

/// random id for newly created records
pub fn create_id() -> Uuid {
    Uuid::new_v4()
}

/// deterministic id derived from a name
///
/// the same name always gives the same id. used for action ids in response
/// headers and for fixture records
pub fn from_name<N>(name: N) -> Uuid
where
    N: AsRef<str>
{
    Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_ref().as_bytes())
}

pub fn parse<G>(given: G) -> Option<Uuid>
where
    G: AsRef<str>
{
    let given_ref = given.as_ref();

    // only the hyphenated form is accepted from clients
    if given_ref.len() != 36 {
        return None;
    }

    Uuid::try_parse(given_ref).ok()
}
