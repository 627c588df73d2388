//! Generic create/read/update/delete over any [`Entity`].
//!
//! Every call checks the session first: reads need `Feature:read`, writes
//! need `Feature:full access`.

use serde_json::{Map, Value};

use super::ServiceContext;
use crate::db::{decode_lossy, to_body, DbError, Document, Filter, LiveQuery, Query, Stored};
use crate::entity::Entity;
use crate::error::ConsoleError;
use crate::ids::{RandomSuffix, SuffixSource};
use crate::models::EntityForm;
use crate::permissions::Access;

type Result<T> = std::result::Result<T, ConsoleError>;

fn require<T: Entity>(ctx: &ServiceContext<'_>, needed: Access) -> Result<()> {
    ctx.session.require(T::KIND.feature(), needed)
}

fn query_for<T: Entity>(filters: Vec<Filter>) -> Query {
    Query::collection(T::KIND.collection()).filters(filters)
}

/// Stored document carrying `human_id`, without a permission check.
pub(crate) fn find_document<T: Entity>(
    ctx: &ServiceContext<'_>,
    human_id: &str,
) -> Result<Option<Document>> {
    let query = query_for::<T>(vec![Filter::eq(T::KIND.id_field(), human_id)]);
    Ok(ctx.store.find_one(&query)?)
}

/// Every record in the collection, oldest first.
pub fn list<T: Entity>(ctx: &ServiceContext<'_>) -> Result<Vec<Stored<T>>> {
    require::<T>(ctx, Access::Read)?;
    let docs = ctx.store.list(T::KIND.collection())?;
    Ok(decode_lossy(&docs))
}

/// Records matching every filter.
pub fn list_where<T: Entity>(
    ctx: &ServiceContext<'_>,
    filters: Vec<Filter>,
) -> Result<Vec<Stored<T>>> {
    require::<T>(ctx, Access::Read)?;
    let docs = ctx.store.query(&query_for::<T>(filters))?;
    Ok(decode_lossy(&docs))
}

pub fn find<T: Entity>(ctx: &ServiceContext<'_>, human_id: &str) -> Result<Option<Stored<T>>> {
    require::<T>(ctx, Access::Read)?;
    match find_document::<T>(ctx, human_id)? {
        Some(doc) => Ok(Some(Stored::from_document(&doc)?)),
        None => Ok(None),
    }
}

pub fn get<T: Entity>(ctx: &ServiceContext<'_>, human_id: &str) -> Result<Stored<T>> {
    find::<T>(ctx, human_id)?.ok_or_else(|| ConsoleError::not_found(T::KIND.label(), human_id))
}

/// Validate a submitted form and store the record under a fresh human id.
pub fn create<F: EntityForm>(ctx: &ServiceContext<'_>, form: &F) -> Result<Stored<F::Record>> {
    require::<F::Record>(ctx, Access::FullAccess)?;
    let record = form.validate()?;
    create_record_with(ctx, record, &mut RandomSuffix)
}

pub fn create_record_with<T: Entity>(
    ctx: &ServiceContext<'_>,
    mut record: T,
    source: &mut dyn SuffixSource,
) -> Result<Stored<T>> {
    require::<T>(ctx, Access::FullAccess)?;
    let id = ctx.ids.generate(T::KIND.id_pattern(), source, |candidate| {
        Ok(find_document::<T>(ctx, candidate)?.is_some())
    })?;
    record.set_human_id(id);

    let doc = ctx.store.create(T::KIND.collection(), to_body(&record)?)?;
    log::info!(
        "{} created {} {}",
        ctx.session.user().email,
        T::KIND.label(),
        record.human_id()
    );
    Ok(Stored::from_document(&doc)?)
}

/// Stored value as the raw text an edit form field would show.
fn form_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Object(_) => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(form_text).collect();
            Some(parts.join(", "))
        }
    }
}

/// Non-blank fields of a form, keyed like the record.
fn entered<F: EntityForm>(form: &F) -> Result<Map<String, Value>> {
    let mut fields = Map::new();
    if let Value::Object(all) = serde_json::to_value(form).map_err(DbError::from)? {
        for (key, value) in all {
            if value.as_str().is_some_and(|text| !text.trim().is_empty()) {
                fields.insert(key, value);
            }
        }
    }
    Ok(fields)
}

/// The edit form for `stored`, with every non-blank field of `submitted`
/// laid over it.
fn prefill<F: EntityForm>(stored: &Map<String, Value>, submitted: &F) -> Result<F> {
    let mut fields: Map<String, Value> = stored
        .iter()
        .filter_map(|(key, value)| Some((key.clone(), Value::String(form_text(value)?))))
        .collect();
    fields.extend(entered(submitted)?);
    Ok(serde_json::from_value(Value::Object(fields)).map_err(DbError::from)?)
}

/// Validate an edit and merge it into the stored record.
///
/// Fields left blank keep their stored value, so the record is validated as
/// a whole with the edit applied. A field that validation drops (a reopened
/// deal's `closedOn`) is cleared. The human id never changes.
pub fn update<F: EntityForm>(
    ctx: &ServiceContext<'_>,
    human_id: &str,
    form: &F,
) -> Result<Stored<F::Record>> {
    require::<F::Record>(ctx, Access::FullAccess)?;
    let doc = find_document::<F::Record>(ctx, human_id)?
        .ok_or_else(|| ConsoleError::not_found(<F::Record as Entity>::KIND.label(), human_id))?;
    let edited = prefill(&doc.data, form)?;
    let record = edited.validate()?;

    let mut fields = to_body(&record)?;
    for (key, _) in entered(&edited)? {
        fields.entry(key).or_insert(Value::Null);
    }
    merge_into::<F::Record>(ctx, &doc, human_id, fields)
}

/// Merge raw fields into the stored record for `human_id`.
pub fn merge_fields<T: Entity>(
    ctx: &ServiceContext<'_>,
    human_id: &str,
    fields: Map<String, Value>,
) -> Result<Stored<T>> {
    require::<T>(ctx, Access::FullAccess)?;
    let doc = find_document::<T>(ctx, human_id)?
        .ok_or_else(|| ConsoleError::not_found(T::KIND.label(), human_id))?;
    merge_into(ctx, &doc, human_id, fields)
}

fn merge_into<T: Entity>(
    ctx: &ServiceContext<'_>,
    doc: &Document,
    human_id: &str,
    mut fields: Map<String, Value>,
) -> Result<Stored<T>> {
    fields.insert(T::KIND.id_field().to_string(), Value::String(human_id.to_string()));
    let merged = ctx.store.merge(T::KIND.collection(), &doc.id, fields)?;
    let stored: Stored<T> = Stored::from_document(&merged)?;
    log::info!(
        "{} updated {} {}",
        ctx.session.user().email,
        T::KIND.label(),
        human_id
    );
    Ok(stored)
}

/// Delete the record for `human_id`. Only some kinds allow this.
pub fn delete<T: Entity>(ctx: &ServiceContext<'_>, human_id: &str) -> Result<()> {
    require::<T>(ctx, Access::FullAccess)?;
    if !T::KIND.supports_delete() {
        return Err(ConsoleError::UnsupportedOperation(format!(
            "{} records cannot be deleted",
            T::KIND.label()
        )));
    }
    let doc = find_document::<T>(ctx, human_id)?
        .ok_or_else(|| ConsoleError::not_found(T::KIND.label(), human_id))?;
    ctx.store.delete(T::KIND.collection(), &doc.id)?;
    log::info!(
        "{} deleted {} {}",
        ctx.session.user().email,
        T::KIND.label(),
        human_id
    );
    Ok(())
}

/// Live view of the records matching `filters`.
pub fn watch<T: Entity>(ctx: &ServiceContext<'_>, filters: Vec<Filter>) -> Result<LiveQuery<T>> {
    require::<T>(ctx, Access::Read)?;
    Ok(ctx.store.subscribe(query_for::<T>(filters))?)
}
