use serde_json::{Map, Value};

use super::{crud, ServiceContext};
use crate::db::{Filter, Stored};
use crate::error::ConsoleError;
use crate::models::{today, Lead, LeadStatus};
use crate::validation::Labelled;

/// Mark a lead converted as of today. Converting twice keeps the first date.
pub fn convert(ctx: &ServiceContext<'_>, lead_id: &str) -> Result<Stored<Lead>, ConsoleError> {
    let lead = crud::get::<Lead>(ctx, lead_id)?;
    if lead.record.is_converted() {
        log::debug!("Lead {} already converted", lead_id);
        return Ok(lead);
    }
    let mut fields = Map::new();
    fields.insert("status".to_string(), Value::from(LeadStatus::Converted.label()));
    fields.insert(
        "convertedOn".to_string(),
        Value::from(today().format("%Y-%m-%d").to_string()),
    );
    crud::merge_fields(ctx, lead_id, fields)
}

pub fn by_campaign(
    ctx: &ServiceContext<'_>,
    campaign_id: &str,
) -> Result<Vec<Stored<Lead>>, ConsoleError> {
    crud::list_where(ctx, vec![Filter::eq("campaignId", campaign_id)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LeadForm;
    use crate::services::test_support::{admin, store};

    #[test]
    fn test_convert_stamps_today() {
        let store = store();
        let session = admin();
        let ctx = ServiceContext::new(&store, &session);

        let lead = crud::create(
            &ctx,
            &LeadForm {
                name: "Jo".into(),
                campaign_id: "CMP-1000".into(),
                ..Default::default()
            },
        )
        .expect("lead");
        let converted = convert(&ctx, &lead.record.lead_id).expect("convert");
        assert_eq!(converted.record.status, LeadStatus::Converted);
        assert_eq!(converted.record.converted_on, Some(today()));
        assert_eq!(by_campaign(&ctx, "CMP-1000").expect("campaign").len(), 1);
    }
}
