use crate::{
    db::DbPool,
    entities::product::{self, Entity as ProductEntity, Model as ProductModel},
    entities::product_translation::{self, Entity as TranslationEntity, Model as TranslationModel},
    entities::product_variant::{self, Entity as VariantEntity, Model as VariantModel},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Product type used for order-line add-ons (gift wrap, cards, ...).
pub const PRODUCT_TYPE_ADDITION: &str = "addition";

/// Storefront display language used when a caller does not specify one.
pub const DEFAULT_LANGUAGE: &str = "fr";

#[derive(Debug, Default, Clone)]
pub struct ProductFilter {
    pub product_type: Option<String>,
    pub published_only: bool,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct NewVariant {
    pub color: Option<String>,
    pub size: Option<String>,
    pub material: Option<String>,
    pub price: Option<Decimal>,
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TranslationResponse {
    pub language: String,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VariantResponse {
    pub id: Uuid,
    pub color: Option<String>,
    pub size: Option<String>,
    pub material: Option<String>,
    pub price: Option<Decimal>,
    pub stock: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub product_type: String,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub translations: Vec<TranslationResponse>,
    pub variants: Vec<VariantResponse>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductListResponse {
    pub products: Vec<ProductResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Read-heavy catalog access plus variant creation.
#[derive(Clone)]
pub struct CatalogService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl CatalogService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Fetches one product with its translations and variants.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn get_product(&self, product_id: Uuid) -> Result<ProductResponse, ServiceError> {
        let db = &*self.db_pool;

        let product = ProductEntity::find_by_id(product_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Product with ID {} not found", product_id))
            })?;

        let translations = TranslationEntity::find()
            .filter(product_translation::Column::ProductId.eq(product_id))
            .all(db)
            .await?;

        let variants = VariantEntity::find()
            .filter(product_variant::Column::ProductId.eq(product_id))
            .all(db)
            .await?;

        Ok(assemble_product(product, translations, variants))
    }

    /// Lists products, newest first, with nested translations and variants.
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        filter: ProductFilter,
        page: u64,
        per_page: u64,
    ) -> Result<ProductListResponse, ServiceError> {
        let db = &*self.db_pool;
        let page = page.max(1);

        let mut query = ProductEntity::find().order_by_desc(product::Column::CreatedAt);
        if let Some(product_type) = &filter.product_type {
            query = query.filter(product::Column::ProductType.eq(product_type.clone()));
        }
        if filter.published_only {
            query = query.filter(product::Column::IsPublished.eq(true));
        }

        let paginator = query.paginate(db, per_page);
        let total = paginator.num_items().await?;
        let products = paginator.fetch_page(page - 1).await?;

        let product_ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();
        let (translations, variants) = if product_ids.is_empty() {
            (Vec::new(), Vec::new())
        } else {
            let translations = TranslationEntity::find()
                .filter(product_translation::Column::ProductId.is_in(product_ids.clone()))
                .all(db)
                .await?;
            let variants = VariantEntity::find()
                .filter(product_variant::Column::ProductId.is_in(product_ids))
                .all(db)
                .await?;
            (translations, variants)
        };

        let products = products
            .into_iter()
            .map(|p| {
                let id = p.id;
                assemble_product(
                    p,
                    translations
                        .iter()
                        .filter(|t| t.product_id == id)
                        .cloned()
                        .collect(),
                    variants
                        .iter()
                        .filter(|v| v.product_id == id)
                        .cloned()
                        .collect(),
                )
            })
            .collect();

        Ok(ProductListResponse {
            products,
            total,
            page,
            per_page,
        })
    }

    /// Lists add-on products ("addition" type), for attaching to order lines.
    #[instrument(skip(self))]
    pub async fn list_additions(&self) -> Result<Vec<ProductResponse>, ServiceError> {
        let listed = self
            .list_products(
                ProductFilter {
                    product_type: Some(PRODUCT_TYPE_ADDITION.to_string()),
                    published_only: true,
                },
                1,
                1000,
            )
            .await?;
        Ok(listed.products)
    }

    /// Creates variants for an existing product in one transaction.
    ///
    /// The product id comes from the caller explicitly; it is never inferred
    /// from unrelated route state.
    #[instrument(skip(self, variants), fields(product_id = %product_id, count = variants.len()))]
    pub async fn create_variants(
        &self,
        product_id: Uuid,
        variants: Vec<NewVariant>,
    ) -> Result<Vec<VariantResponse>, ServiceError> {
        if variants.is_empty() {
            return Err(ServiceError::ValidationError(
                "At least one variant is required".to_string(),
            ));
        }
        for variant in &variants {
            variant
                .validate()
                .map_err(|e| ServiceError::ValidationError(e.to_string()))?;
        }

        let db = &*self.db_pool;

        let txn = db.begin().await.map_err(|e| {
            error!(error = %e, %product_id, "Failed to start variant creation transaction");
            ServiceError::DatabaseError(e)
        })?;

        // The product must exist before variants can hang off it.
        ProductEntity::find_by_id(product_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Product with ID {} not found", product_id))
            })?;

        let count = variants.len();
        let new_ids: Vec<Uuid> = (0..count).map(|_| Uuid::new_v4()).collect();
        let active_models: Vec<product_variant::ActiveModel> = variants
            .into_iter()
            .zip(new_ids.iter())
            .map(|(v, id)| product_variant::ActiveModel {
                id: Set(*id),
                product_id: Set(product_id),
                color: Set(v.color),
                size: Set(v.size),
                material: Set(v.material),
                price: Set(v.price),
                stock: Set(v.stock),
            })
            .collect();

        VariantEntity::insert_many(active_models)
            .exec(&txn)
            .await
            .map_err(|e| {
                error!(error = %e, %product_id, "Failed to insert variants");
                ServiceError::DatabaseError(e)
            })?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, %product_id, "Failed to commit variant creation");
            ServiceError::DatabaseError(e)
        })?;

        info!(%product_id, count, "Variants created");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::VariantsCreated { product_id, count })
                .await
            {
                warn!(error = %e, %product_id, "Failed to send variants created event");
            }
        }

        // Return only the rows this call inserted, not every variant of the
        // product.
        let created = VariantEntity::find()
            .filter(product_variant::Column::Id.is_in(new_ids))
            .all(db)
            .await?;

        Ok(created.into_iter().map(variant_to_response).collect())
    }
}

/// Picks the translation for a language code, falling back to the first
/// available translation when no exact match exists.
pub fn translation_for<'a>(
    translations: &'a [TranslationModel],
    language: &str,
) -> Option<&'a TranslationModel> {
    translations
        .iter()
        .find(|t| t.language == language)
        .or_else(|| translations.first())
}

fn assemble_product(
    product: ProductModel,
    translations: Vec<TranslationModel>,
    variants: Vec<VariantModel>,
) -> ProductResponse {
    ProductResponse {
        id: product.id,
        product_type: product.product_type,
        price: product.price,
        image_url: product.image_url,
        is_published: product.is_published,
        created_at: product.created_at,
        translations: translations
            .into_iter()
            .map(|t| TranslationResponse {
                language: t.language,
                name: t.name,
                description: t.description,
            })
            .collect(),
        variants: variants.into_iter().map(variant_to_response).collect(),
    }
}

fn variant_to_response(v: VariantModel) -> VariantResponse {
    VariantResponse {
        id: v.id,
        color: v.color,
        size: v.size,
        material: v.material,
        price: v.price,
        stock: v.stock,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translation(language: &str, name: &str) -> TranslationModel {
        TranslationModel {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            language: language.into(),
            name: name.into(),
            description: None,
        }
    }

    #[test]
    fn translation_lookup_matches_language_code() {
        let translations = vec![translation("en", "Teapot"), translation("fr", "Théière")];
        let hit = translation_for(&translations, "fr").unwrap();
        assert_eq!(hit.name, "Théière");
    }

    #[test]
    fn translation_lookup_falls_back_to_first() {
        let translations = vec![translation("en", "Teapot"), translation("fr", "Théière")];
        let hit = translation_for(&translations, "ar").unwrap();
        assert_eq!(hit.name, "Teapot");
    }

    #[test]
    fn translation_lookup_on_empty_set_is_none() {
        assert!(translation_for(&[], "en").is_none());
    }
}
