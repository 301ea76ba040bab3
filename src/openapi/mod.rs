use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Office Supplies API",
        version = "0.1.0",
        description = r#"
# Office Supplies Inventory API

Stock levels for office consumables, usage logging per employee and department,
and a replenishment-request workflow.

- **Supplies**: catalog of consumables with reorder thresholds
- **Usage**: record consumption and browse the usage log
- **Requests**: replenishment requests; completing one credits stock once
- **Statistics**: totals, low-stock count and the six-month usage trend

Errors share one body:

```json
{
  "error": "Unprocessable Entity",
  "message": "Insufficient stock: supply 3 has 2 unit(s), 5 requested",
  "timestamp": "2024-01-01T00:00:00Z"
}
```
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:5600", description = "Local development")
    ),
    tags(
        (name = "supplies", description = "Supply catalog and low-stock report"),
        (name = "usage", description = "Consumption logging"),
        (name = "requests", description = "Replenishment workflow"),
        (name = "statistics", description = "Aggregated figures")
    ),
    paths(
        crate::handlers::supplies::list_supplies,
        crate::handlers::supplies::get_low_stock,
        crate::handlers::supplies::get_supply,
        crate::handlers::supplies::create_supply,
        crate::handlers::supplies::update_supply,
        crate::handlers::supplies::delete_supply,
        crate::handlers::usage::record_usage,
        crate::handlers::usage::get_usage_history,
        crate::handlers::requests::list_requests,
        crate::handlers::requests::create_request,
        crate::handlers::requests::update_request_status,
        crate::handlers::statistics::get_statistics,
    ),
    components(
        schemas(
            crate::entities::supply_item::Model,
            crate::entities::usage_record::Model,
            crate::entities::supply_request::Model,
            crate::entities::RequestStatus,
            crate::services::supplies::SupplyInput,
            crate::services::ledger::RecordUsageInput,
            crate::services::requests::CreateRequestInput,
            crate::services::requests::RequestWithSupply,
            crate::services::statistics::Statistics,
            crate::services::statistics::MonthlyUsage,
            crate::services::statistics::UsageWithSupply,
            crate::handlers::requests::UpdateStatusRequest,
            crate::ResponseMeta,
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDocV1::openapi())
}
