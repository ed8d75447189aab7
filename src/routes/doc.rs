use utoipa::{OpenApi, openapi::OpenApi as OpenApiSpec};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        cars::{CarList, CreateCarRequest, UpdateCarRequest, UpdateCarStatusRequest},
        catalog::{CatalogList, CreateCatalogEntryRequest, UpdateCatalogEntryRequest},
    },
    enums::CarStatus,
    filters::{CarFilters, CarFiltersData, CatalogOption, NumericRange, RawCarFilters, SortBy},
    models::{Car, CatalogEntry, CatalogRef},
    reference::{BodyType, ReferenceData},
    response::{ActionResponse, PaginationInfo},
    routes::{admin, cars, health, reference},
    schedule::DayHours,
    validation::FieldError,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        cars::search_cars,
        cars::filter_options,
        cars::get_car,
        reference::reference_data,
        reference::body_types,
        admin::list_makes,
        admin::create_make,
        admin::update_make,
        admin::delete_make,
        admin::list_colors,
        admin::create_color,
        admin::update_color,
        admin::delete_color,
        admin::create_car,
        admin::update_car,
        admin::update_car_status,
        admin::delete_car
    ),
    components(
        schemas(
            Car,
            CarStatus,
            CatalogEntry,
            CatalogRef,
            CarList,
            CarFilters,
            RawCarFilters,
            SortBy,
            CarFiltersData,
            CatalogOption,
            NumericRange,
            PaginationInfo,
            FieldError,
            BodyType,
            DayHours,
            ReferenceData,
            reference::BodyTypeList,
            CreateCarRequest,
            UpdateCarRequest,
            UpdateCarStatusRequest,
            CatalogList,
            CreateCatalogEntryRequest,
            UpdateCatalogEntryRequest,
            ActionResponse<Car>,
            ActionResponse<CarList>,
            ActionResponse<CarFiltersData>,
            ActionResponse<CatalogEntry>,
            ActionResponse<ReferenceData>
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Cars", description = "Public car search"),
        (name = "Reference", description = "Read-only reference tables"),
        (name = "Admin", description = "Catalog administration"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
