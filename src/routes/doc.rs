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
    cart::{CartLine, CheckoutTotals},
    dto::{
        addresses::{AddressList, CreateAddressRequest},
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        bills::{BillList, CreateBillRequest},
        cart::{AddToCartRequest, CartLineView, CartView, QuantityStep, SetQuantityRequest, StepQuantityRequest},
        categories::{CategoryList, CreateCategoryRequest, UpdateCategoryRequest},
        checkout::{CheckoutRequest, CheckoutResponse},
        clients::{ClientList, CreateClientRequest, UpdateClientRequest},
        dashboard::{DashboardStats, StatusCount},
        order_details::{CreateOrderDetailRequest, OrderDetailList},
        orders::{
            CreateOrderRequest, OrderHistory, OrderHistoryEntry, OrderHistoryLine, OrderList,
            OrderWithDetails, UpdateOrderRequest,
        },
        products::{CreateProductRequest, ProductList, UpdateProductRequest},
        reviews::{CreateReviewRequest, ReviewList},
    },
    models::{
        Address, Bill, Category, Client, Order, OrderDetail, OrderStatus, PaymentType, Product,
        Review, User,
    },
    response::{ApiResponse, Meta},
    routes::{
        addresses, auth, bills, carts, categories, clients, dashboard, health, order_details,
        orders, params, products, reviews,
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
        health::readiness,
        auth::login,
        auth::register,
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        categories::list_categories,
        categories::get_category,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        clients::list_clients,
        clients::get_client,
        clients::create_client,
        clients::update_client,
        clients::delete_client,
        addresses::list_addresses,
        addresses::create_address,
        addresses::delete_address,
        bills::list_bills,
        bills::get_bill,
        bills::create_bill,
        orders::list_orders,
        orders::get_order,
        orders::create_order,
        orders::update_order,
        orders::order_history,
        order_details::list_order_details,
        order_details::create_order_detail,
        reviews::list_reviews,
        reviews::create_review,
        reviews::delete_review,
        carts::create_cart,
        carts::get_cart,
        carts::clear_cart,
        carts::add_item,
        carts::set_quantity,
        carts::step_quantity,
        carts::remove_item,
        carts::checkout,
        dashboard::dashboard
    ),
    components(
        schemas(
            User,
            Product,
            Category,
            Client,
            Address,
            Bill,
            Order,
            OrderDetail,
            OrderStatus,
            PaymentType,
            Review,
            CartLine,
            CheckoutTotals,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            CreateCategoryRequest,
            UpdateCategoryRequest,
            CategoryList,
            CreateClientRequest,
            UpdateClientRequest,
            ClientList,
            CreateAddressRequest,
            AddressList,
            CreateBillRequest,
            BillList,
            CreateOrderRequest,
            UpdateOrderRequest,
            OrderList,
            OrderWithDetails,
            OrderHistory,
            OrderHistoryEntry,
            OrderHistoryLine,
            CreateOrderDetailRequest,
            OrderDetailList,
            CreateReviewRequest,
            ReviewList,
            AddToCartRequest,
            SetQuantityRequest,
            StepQuantityRequest,
            QuantityStep,
            CartView,
            CartLineView,
            CheckoutRequest,
            CheckoutResponse,
            DashboardStats,
            StatusCount,
            params::Pagination,
            params::SortOrder,
            params::ProductSortBy,
            health::HealthData,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<CartView>,
            ApiResponse<CheckoutResponse>,
            ApiResponse<OrderWithDetails>,
            ApiResponse<OrderList>,
            ApiResponse<OrderHistory>,
            ApiResponse<DashboardStats>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Auth", description = "Admin authentication"),
        (name = "Products", description = "Product catalog"),
        (name = "Categories", description = "Product categories"),
        (name = "Clients", description = "Customer records"),
        (name = "Addresses", description = "Shipping addresses"),
        (name = "Bills", description = "Bills"),
        (name = "Orders", description = "Orders and order details"),
        (name = "Reviews", description = "Product reviews"),
        (name = "Cart", description = "Guest carts"),
        (name = "Checkout", description = "Turning a cart into an order"),
        (name = "Admin", description = "Dashboard"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
