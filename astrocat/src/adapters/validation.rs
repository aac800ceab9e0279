//! Input checks run before any database access.

use crate::db::models::associations::AssociationPair;
use crate::errors::{Error, Result};
use crate::types::Entity;
use tracing::debug;
use uuid::Uuid;

/// Every mutation must name the actor performing it
pub fn require_updated_by(updated_by: &str) -> Result<()> {
    if updated_by.is_empty() {
        debug!("Rejected mutation without an updated_by actor");
        return Err(Error::InvalidUpdatedByValue);
    }
    Ok(())
}

pub fn require_name(entity: Entity, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        debug!(%entity, "Rejected empty name");
        return Err(Error::InvalidName { entity });
    }
    Ok(())
}

/// Parse every id up front so that one bad id rejects the whole batch
pub fn parse_ids(entity: Entity, ids: &[String]) -> Result<Vec<Uuid>> {
    ids.iter()
        .map(|raw| {
            Uuid::parse_str(raw.trim()).map_err(|_| {
                debug!(%entity, id = %raw, "Rejected malformed id");
                Error::InvalidId { entity }
            })
        })
        .collect()
}

/// Reject association pairs with a nil component
pub fn require_pairs(entity: Entity, pairs: &[AssociationPair]) -> Result<()> {
    if let Some(pair) = pairs.iter().find(|p| p.has_nil()) {
        debug!(%entity, left_id = %pair.left_id, right_id = %pair.right_id, "Rejected association pair with nil id");
        return Err(Error::InvalidId { entity });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_updated_by() {
        assert!(matches!(require_updated_by(""), Err(Error::InvalidUpdatedByValue)));
        assert!(require_updated_by("admin@example.com").is_ok());
    }

    #[test]
    fn test_require_name() {
        assert!(matches!(
            require_name(Entity::Community, "   "),
            Err(Error::InvalidName {
                entity: Entity::Community
            })
        ));
        assert!(require_name(Entity::Service, "Yoga").is_ok());
    }

    #[test]
    fn test_parse_ids_rejects_whole_batch() {
        let good = Uuid::new_v4();
        let parsed = parse_ids(Entity::Local, &[good.to_string()]).unwrap();
        assert_eq!(parsed, vec![good]);

        let result = parse_ids(Entity::Reservation, &[good.to_string(), "not-a-uuid".to_string()]);
        assert!(matches!(
            result,
            Err(Error::InvalidId {
                entity: Entity::Reservation
            })
        ));

        assert!(parse_ids(Entity::Local, &[]).unwrap().is_empty());
    }

    #[test]
    fn test_require_pairs() {
        let ok = AssociationPair::new(Uuid::new_v4(), Uuid::new_v4());
        let nil = AssociationPair::new(Uuid::nil(), Uuid::new_v4());
        assert!(require_pairs(Entity::ServiceLocal, &[ok]).is_ok());
        assert!(matches!(
            require_pairs(Entity::ServiceLocal, &[ok, nil]),
            Err(Error::InvalidId {
                entity: Entity::ServiceLocal
            })
        ));
    }
}
