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
        Deleted,
        auth::{LoginRequest, LoginResponse},
        blogs::{BlogList, CreateBlogRequest, UpdateBlogRequest},
        categories::{
            CategoryDeleted, CategoryList, CategoryPage, CategoryTree, CategoryTreeNode,
            CreateCategoryRequest, UpdateCategoryRequest,
        },
        events::{
            CreateEventRequest, CustomerInput, EventList, LiffEvents, LiffEventsRequest,
            UpdateEventRequest,
        },
        products::{
            CreateProductRequest, ProductImagesResult, ProductList, ProductSaved,
            UpdateProductRequest,
        },
        promotions::{CreatePromotionRequest, PromotionList, UpdatePromotionRequest},
        showcase::{
            CreateDesignRequest, CreatePortfolioRequest, DesignList, DesignSaved, PortfolioList, PortfolioSaved,
            UpdateDesignRequest, UpdatePortfolioRequest,
        },
        upload::{BatchUploadForm, DeleteUploadRequest, RemovedFile, UploadForm, UploadedFile},
        users::{CreateUserRequest, UpdateUserRequest, UserList},
    },
    models::{
        Blog, BreadcrumbItem, Category, CategoryWithCounts, Counters, Customer, Design, Event,
        Portfolio, Product, Promotion, Review, SiteSettings, User,
    },
    response::{ApiResponse, Meta},
    routes::{
        auth, blogs, categories, designs, events, health, liff, params, portfolios, products,
        promotions, settings, upload, users,
    },
    storage::{UploadOutcome, UploadReport},
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
        auth::login,
        categories::category_tree,
        categories::list_categories,
        categories::category_page_admin,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        products::list_products,
        products::category_page,
        products::get_product,
        products::list_products_admin,
        products::get_product_admin,
        products::create_product,
        products::update_product,
        products::delete_product,
        products::attach_images,
        portfolios::list_portfolios,
        portfolios::get_portfolio,
        portfolios::like_portfolio,
        portfolios::view_portfolio,
        portfolios::list_portfolios_admin,
        portfolios::create_portfolio,
        portfolios::update_portfolio,
        portfolios::delete_portfolio,
        designs::list_designs,
        designs::get_design,
        designs::like_design,
        designs::view_design,
        designs::list_designs_admin,
        designs::create_design,
        designs::update_design,
        designs::delete_design,
        promotions::list_promotions,
        promotions::list_promotions_admin,
        promotions::create_promotion,
        promotions::update_promotion,
        promotions::delete_promotion,
        blogs::list_blogs,
        blogs::get_blog,
        blogs::list_blogs_admin,
        blogs::get_blog_admin,
        blogs::create_blog,
        blogs::update_blog,
        blogs::delete_blog,
        liff::liff_events,
        liff::liff_promotions,
        events::list_events,
        events::create_event,
        events::update_event,
        events::delete_event,
        users::list_users,
        users::create_user,
        users::update_user,
        users::delete_user,
        settings::get_settings,
        settings::update_settings,
        upload::upload_file,
        upload::upload_batch,
        upload::delete_file
    ),
    components(
        schemas(
            Category,
            CategoryWithCounts,
            BreadcrumbItem,
            Product,
            Portfolio,
            Design,
            Counters,
            Promotion,
            Blog,
            Customer,
            Review,
            Event,
            User,
            SiteSettings,
            LoginRequest,
            LoginResponse,
            CreateCategoryRequest,
            UpdateCategoryRequest,
            CategoryList,
            CategoryTree,
            CategoryTreeNode,
            CategoryDeleted,
            CategoryPage,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            ProductSaved,
            ProductImagesResult,
            CreatePortfolioRequest,
            UpdatePortfolioRequest,
            PortfolioList,
            PortfolioSaved,
            CreateDesignRequest,
            UpdateDesignRequest,
            DesignList,
            DesignSaved,
            CreatePromotionRequest,
            UpdatePromotionRequest,
            PromotionList,
            CreateBlogRequest,
            UpdateBlogRequest,
            BlogList,
            LiffEventsRequest,
            LiffEvents,
            CustomerInput,
            CreateEventRequest,
            UpdateEventRequest,
            EventList,
            CreateUserRequest,
            UpdateUserRequest,
            UserList,
            UploadForm,
            BatchUploadForm,
            DeleteUploadRequest,
            UploadedFile,
            RemovedFile,
            UploadOutcome,
            UploadReport,
            Deleted,
            params::Pagination,
            params::LikeAction,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<CategoryPage>,
            ApiResponse<CategoryTree>,
            ApiResponse<Counters>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Staff authentication"),
        (name = "Categories", description = "Public category tree"),
        (name = "Products", description = "Public catalog: listings and category pages"),
        (name = "Showcase", description = "Portfolio and design galleries"),
        (name = "Promotions", description = "Running promotions"),
        (name = "Blog", description = "Published posts"),
        (name = "LIFF", description = "LINE mini-app endpoints"),
        (name = "Settings", description = "Site settings"),
        (name = "Upload", description = "Image uploads"),
        (name = "Admin", description = "Admin dashboard endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
