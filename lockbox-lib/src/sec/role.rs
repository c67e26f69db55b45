use std::error::Error;

use serde::{Serialize, Deserialize};
use bytes::BytesMut;
use postgres_types::{to_sql_checked, Type, IsNull, ToSql, FromSql};

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
    Guest,
    Root,
}

impl Role {
    pub fn from_str(v: &str) -> Option<Self> {
        match v {
            "admin" => Some(Role::Admin),
            "user" => Some(Role::User),
            "guest" => Some(Role::Guest),
            "root" => Some(Role::Root),
            _ => None
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
            Role::Guest => "guest",
            Role::Root => "root",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'a> FromSql<'a> for Role {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Role, Box<dyn Error + Sync + Send>> {
        let v = <&str as FromSql>::from_sql(ty, raw)?;

        Role::from_str(v)
            .ok_or("invalid sql value for Role. expecting \"admin\", \"user\", \"guest\" or \"root\"".into())
    }

    fn accepts(ty: &Type) -> bool {
        <&str as FromSql>::accepts(ty)
    }
}

impl ToSql for Role {
    fn to_sql(&self, ty: &Type, w: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        let v = self.as_str();

        v.to_sql(ty, w)
    }

    fn accepts(ty: &Type) -> bool {
        <&str as ToSql>::accepts(ty)
    }

    to_sql_checked!();
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn str_round_trip() {
        for role in [Role::Admin, Role::User, Role::Guest, Role::Root] {
            assert_eq!(Role::from_str(role.as_str()), Some(role));
        }

        assert_eq!(Role::from_str("Admin"), None, "role names are lowercase");
    }
}
