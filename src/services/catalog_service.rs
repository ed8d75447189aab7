//! Makes and colors. Slugs are derived from names, unique per table, and
//! frozen once any car references the entry.

use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::catalog::{CreateCatalogEntryRequest, UpdateCatalogEntryRequest},
    error::{AppError, AppResult},
    models::{CatalogEntry, CatalogKind, NewCatalogEntry},
    repository::{
        CatalogReader, CatalogWriter, Repository, duplicate_slug, entry_in_use, slug_frozen,
    },
    services::audit,
    slug::slugify,
    validation::ValidationErrors,
};

pub async fn list_entries<R>(repo: &R, kind: CatalogKind) -> AppResult<Vec<CatalogEntry>>
where
    R: CatalogReader + ?Sized,
{
    repo.list_entries(kind).await
}

pub async fn create_entry<R>(
    repo: &R,
    kind: CatalogKind,
    payload: CreateCatalogEntryRequest,
) -> AppResult<CatalogEntry>
where
    R: Repository + ?Sized,
{
    let mut errors = ValidationErrors::from_rules(payload.validate());
    let name = payload.name.trim().to_string();
    let slug = clean_slug(
        &mut errors,
        payload.slug.as_deref().unwrap_or(payload.name.as_str()),
    );
    if !errors.is_empty() {
        return Err(errors.into());
    }

    if repo.find_entry_by_slug(kind, &slug).await?.is_some() {
        return Err(duplicate_slug(kind, &slug));
    }

    let entry = repo
        .insert_entry(kind, &NewCatalogEntry { name, slug })
        .await?;
    tracing::info!(kind = kind.label(), slug = %entry.slug, "catalog entry created");

    audit(
        repo,
        &format!("{}_create", kind.label()),
        kind.table(),
        json!({ "id": entry.id, "slug": entry.slug }),
    )
    .await;

    Ok(entry)
}

/// Renames an entry. The slug only changes when one is given explicitly,
/// and never while cars still reference the entry.
pub async fn update_entry<R>(
    repo: &R,
    kind: CatalogKind,
    id: Uuid,
    payload: UpdateCatalogEntryRequest,
) -> AppResult<CatalogEntry>
where
    R: Repository + ?Sized,
{
    let existing = repo
        .find_entry(kind, id)
        .await?
        .ok_or_else(|| AppError::not_found(kind.title()))?;

    let mut errors = ValidationErrors::from_rules(payload.validate());
    let name = match payload.name.as_deref() {
        Some(name) => name.trim().to_string(),
        None => existing.name.clone(),
    };
    let slug = match payload.slug.as_deref() {
        Some(slug) => clean_slug(&mut errors, slug),
        None => existing.slug.clone(),
    };
    if !errors.is_empty() {
        return Err(errors.into());
    }

    // The store re-checks references atomically with the write.
    if slug != existing.slug {
        if repo.count_cars_using(kind, id).await? > 0 {
            return Err(slug_frozen(kind, &existing.slug));
        }
        if repo.find_entry_by_slug(kind, &slug).await?.is_some() {
            return Err(duplicate_slug(kind, &slug));
        }
    }

    let entry = repo
        .update_entry(kind, id, &NewCatalogEntry { name, slug })
        .await?
        .ok_or_else(|| AppError::not_found(kind.title()))?;

    audit(
        repo,
        &format!("{}_update", kind.label()),
        kind.table(),
        json!({ "id": id, "from": existing.slug, "to": entry.slug }),
    )
    .await;

    Ok(entry)
}

pub async fn delete_entry<R>(repo: &R, kind: CatalogKind, id: Uuid) -> AppResult<()>
where
    R: Repository + ?Sized,
{
    let existing = repo
        .find_entry(kind, id)
        .await?
        .ok_or_else(|| AppError::not_found(kind.title()))?;
    if repo.count_cars_using(kind, id).await? > 0 {
        return Err(entry_in_use(kind, &existing.slug));
    }
    if !repo.delete_entry(kind, id).await? {
        return Err(AppError::not_found(kind.title()));
    }

    audit(
        repo,
        &format!("{}_delete", kind.label()),
        kind.table(),
        json!({ "id": id, "slug": existing.slug }),
    )
    .await;

    Ok(())
}

fn clean_slug(errors: &mut ValidationErrors, source: &str) -> String {
    let slug = slugify(source);
    if slug.is_empty() {
        errors.add(
            "slug",
            "must contain at least one Latin letter or digit; other scripts are dropped",
        );
    }
    slug
}
