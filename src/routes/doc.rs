use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, RecoverRequest, RegisterRequest, ResetPasswordRequest},
        delivery_notes::{
            CreateDeliveryNoteRequest, DeliveryNoteFilter, DeliveryNoteList,
            UpdateDeliveryNoteRequest, UpdateDeliveryStatusRequest,
        },
        incidents::{
            CreateIncidentRequest, IncidentFilter, IncidentList, ResolveIncidentRequest,
            UpdateIncidentRequest,
        },
        inventory::{MovementFilter, MovementList, RecordMovementRequest},
        orders::{
            CreateOrderItemRequest, CreateOrderRequest, CreateOrderWithItemsRequest, OrderFilter,
            OrderItemInput, OrderItemList, OrderList, OrderWithItems, UpdateOrderItemRequest,
            UpdateOrderRequest, UpdateOrderStatusRequest,
        },
        products::{CreateProductRequest, ProductList, UpdateProductRequest},
        suppliers::{
            CreateSupplierRequest, SupplierFilter, SupplierList, SupplierSearch,
            UpdateSupplierRequest,
        },
        users::{UpdateUserRequest, UserList},
    },
    entity::{
        delivery_notes::DeliveryStatus,
        incidents::{IncidentPriority, IncidentStatus},
        inventory_movements::MovementType,
        orders::OrderStatus,
        users::Role,
    },
    models::{
        DeliveryNote, Incident, InventoryMovement, Order, OrderItem, Product, ProductStock,
        Supplier, User,
    },
    pagination::{PageQuery, SortOrder},
    response::{ApiResponse, Meta},
    routes::{
        auth, delivery_notes, health, incidents, inventory, order_items, orders, products,
        suppliers, users,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::me,
        auth::recover,
        auth::reset,
        users::list_users,
        users::get_user,
        users::update_user,
        users::deactivate_user,
        products::list_products,
        products::get_product,
        products::get_product_by_code,
        products::create_product,
        products::update_product,
        products::deactivate_product,
        products::delete_product,
        orders::list_orders,
        orders::create_order,
        orders::create_order_with_items,
        orders::list_orders_by_user,
        orders::get_order_by_number,
        orders::get_order,
        orders::update_order,
        orders::update_order_status,
        orders::cancel_order,
        orders::delete_order,
        orders::list_order_items,
        order_items::create_order_item,
        order_items::get_order_item,
        order_items::update_order_item,
        order_items::delete_order_item,
        inventory::list_movements,
        inventory::record_entry,
        inventory::record_exit,
        inventory::record_adjustment,
        inventory::record_loss,
        inventory::list_product_movements,
        inventory::product_stock,
        inventory::get_movement,
        suppliers::list_suppliers,
        suppliers::search_suppliers,
        suppliers::get_supplier,
        suppliers::create_supplier,
        suppliers::update_supplier,
        suppliers::deactivate_supplier,
        suppliers::delete_supplier,
        incidents::list_incidents,
        incidents::list_incidents_by_order,
        incidents::get_incident,
        incidents::create_incident,
        incidents::update_incident,
        incidents::resolve_incident,
        incidents::delete_incident,
        delivery_notes::list_delivery_notes,
        delivery_notes::list_delivery_notes_by_order,
        delivery_notes::get_delivery_note,
        delivery_notes::create_delivery_note,
        delivery_notes::update_delivery_note,
        delivery_notes::update_delivery_status,
        delivery_notes::delete_delivery_note
    ),
    components(
        schemas(
            User,
            Role,
            Product,
            ProductStock,
            Order,
            OrderStatus,
            OrderItem,
            InventoryMovement,
            MovementType,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            RecoverRequest,
            ResetPasswordRequest,
            UpdateUserRequest,
            UserList,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            CreateOrderRequest,
            CreateOrderWithItemsRequest,
            OrderItemInput,
            UpdateOrderRequest,
            UpdateOrderStatusRequest,
            OrderFilter,
            CreateOrderItemRequest,
            UpdateOrderItemRequest,
            OrderWithItems,
            OrderList,
            OrderItemList,
            RecordMovementRequest,
            MovementFilter,
            MovementList,
            Supplier,
            CreateSupplierRequest,
            UpdateSupplierRequest,
            SupplierFilter,
            SupplierSearch,
            SupplierList,
            Incident,
            IncidentPriority,
            IncidentStatus,
            CreateIncidentRequest,
            UpdateIncidentRequest,
            ResolveIncidentRequest,
            IncidentFilter,
            IncidentList,
            DeliveryNote,
            DeliveryStatus,
            CreateDeliveryNoteRequest,
            UpdateDeliveryNoteRequest,
            UpdateDeliveryStatusRequest,
            DeliveryNoteFilter,
            DeliveryNoteList,
            PageQuery,
            SortOrder,
            Meta,
            ApiResponse<User>,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<Order>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<MovementList>,
            ApiResponse<ProductStock>,
            ApiResponse<Supplier>,
            ApiResponse<SupplierList>,
            ApiResponse<Incident>,
            ApiResponse<IncidentList>,
            ApiResponse<DeliveryNote>,
            ApiResponse<DeliveryNoteList>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Users", description = "User administration"),
        (name = "Products", description = "Product catalogue"),
        (name = "Orders", description = "Order workflow"),
        (name = "Order items", description = "Order line items"),
        (name = "Inventory", description = "Stock ledger"),
        (name = "Suppliers", description = "Supplier directory"),
        (name = "Incidents", description = "Problems reported against orders"),
        (name = "Delivery notes", description = "Shipment paperwork per order"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
