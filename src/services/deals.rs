use serde_json::{Map, Value};

use super::{crud, ServiceContext};
use crate::db::{Filter, Stored};
use crate::error::ConsoleError;
use crate::models::{today, Deal, DealStage};
use crate::validation::Labelled;

/// Move a deal to `stage`. Closing stamps `closedOn` with today; reopening
/// clears it.
pub fn move_stage(
    ctx: &ServiceContext<'_>,
    deal_id: &str,
    stage: DealStage,
) -> Result<Stored<Deal>, ConsoleError> {
    let deal = crud::get::<Deal>(ctx, deal_id)?;
    let mut fields = Map::new();
    fields.insert("stage".to_string(), Value::from(stage.label()));
    let closed_on = match (stage.is_closed(), deal.record.closed_on) {
        (true, Some(existing)) if deal.record.stage.is_closed() => {
            Value::from(existing.format("%Y-%m-%d").to_string())
        }
        (true, _) => Value::from(today().format("%Y-%m-%d").to_string()),
        (false, _) => Value::Null,
    };
    fields.insert("closedOn".to_string(), closed_on);
    log::info!("Deal {} moved {:?} -> {:?}", deal_id, deal.record.stage, stage);
    crud::merge_fields(ctx, deal_id, fields)
}

pub fn by_owner(
    ctx: &ServiceContext<'_>,
    employee_id: &str,
) -> Result<Vec<Stored<Deal>>, ConsoleError> {
    crud::list_where(ctx, vec![Filter::eq("ownerId", employee_id)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DealForm;
    use crate::services::test_support::{admin, store};

    #[test]
    fn test_close_and_reopen() {
        let store = store();
        let session = admin();
        let ctx = ServiceContext::new(&store, &session);

        let deal = crud::create(
            &ctx,
            &DealForm {
                title: "Renewal".into(),
                owner_id: "EMP-1000".into(),
                value: "5000".into(),
                ..Default::default()
            },
        )
        .expect("deal");
        let id = deal.record.deal_id.clone();

        let won = move_stage(&ctx, &id, DealStage::ClosedWon).expect("won");
        assert_eq!(won.record.stage, DealStage::ClosedWon);
        assert_eq!(won.record.closed_on, Some(today()));

        let reopened = move_stage(&ctx, &id, DealStage::Negotiation).expect("reopen");
        assert!(reopened.record.closed_on.is_none());
        assert_eq!(by_owner(&ctx, "EMP-1000").expect("owner").len(), 1);
    }
}
