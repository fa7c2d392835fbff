//! Fixtures shared by the inline test modules.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use sea_orm_migration::MigratorTrait;

use crate::infrastructure::database::entities::role::HAIRDRESSER_ROLE;
use crate::infrastructure::database::entities::{
    category, dying, facial_hair, hairstyle, length, manufacturer, product, role, user, user_role,
};
use crate::infrastructure::database::migrator::Migrator;
use crate::infrastructure::database::{init_database, DatabaseConfig};

pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

/// Fresh migrated in-memory database
pub async fn test_db() -> DatabaseConnection {
    init_test_tracing();
    let db = init_database(&DatabaseConfig::in_memory())
        .await
        .expect("in-memory database");
    Migrator::up(&db, None).await.expect("migrations");
    db
}

pub async fn role_id(db: &DatabaseConnection, name: &str) -> i32 {
    role::Entity::find()
        .filter(role::Column::Name.eq(name))
        .one(db)
        .await
        .expect("role query")
        .unwrap_or_else(|| panic!("role {name} is seeded"))
        .id
}

pub async fn create_user(db: &DatabaseConnection, username: &str) -> user::Model {
    user::ActiveModel {
        first_name: Set(username.to_string()),
        last_name: Set("Tester".to_string()),
        email: Set(format!("{username}@salon.test")),
        username: Set(username.to_string()),
        phone_number: Set(None),
        city_id: Set(None),
        is_active: Set(true),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert user")
}

pub async fn create_hairdresser(db: &DatabaseConnection, username: &str) -> user::Model {
    let user = create_user(db, username).await;
    let role_id = role_id(db, HAIRDRESSER_ROLE).await;
    user_role::ActiveModel {
        user_id: Set(user.id),
        role_id: Set(role_id),
        date_assigned: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("assign hairdresser role");
    user
}

pub async fn create_category(db: &DatabaseConnection, name: &str) -> category::Model {
    category::ActiveModel {
        name: Set(name.to_string()),
        description: Set(None),
        is_active: Set(true),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert category")
}

pub async fn create_manufacturer(db: &DatabaseConnection, name: &str) -> manufacturer::Model {
    manufacturer::ActiveModel {
        name: Set(name.to_string()),
        description: Set(None),
        is_active: Set(true),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert manufacturer")
}

pub async fn create_product_in(
    db: &DatabaseConnection,
    name: &str,
    price: Decimal,
    category_id: i32,
    manufacturer_id: i32,
) -> product::Model {
    product::ActiveModel {
        name: Set(name.to_string()),
        price: Set(price),
        picture: Set(None),
        is_active: Set(true),
        category_id: Set(category_id),
        manufacturer_id: Set(manufacturer_id),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert product")
}

/// Product in the shared "General" category made by "Generic"
pub async fn create_product(db: &DatabaseConnection, name: &str, price: Decimal) -> product::Model {
    let category = match category::Entity::find()
        .filter(category::Column::Name.eq("General"))
        .one(db)
        .await
        .expect("category query")
    {
        Some(existing) => existing,
        None => create_category(db, "General").await,
    };
    let manufacturer = match manufacturer::Entity::find()
        .filter(manufacturer::Column::Name.eq("Generic"))
        .one(db)
        .await
        .expect("manufacturer query")
    {
        Some(existing) => existing,
        None => create_manufacturer(db, "Generic").await,
    };
    create_product_in(db, name, price, category.id, manufacturer.id).await
}

pub async fn create_length(db: &DatabaseConnection, name: &str) -> length::Model {
    length::ActiveModel {
        name: Set(name.to_string()),
        image: Set(None),
        is_active: Set(true),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert length")
}

pub async fn create_hairstyle(db: &DatabaseConnection, name: &str, price: Decimal) -> hairstyle::Model {
    let length = match length::Entity::find()
        .filter(length::Column::Name.eq("Standard"))
        .one(db)
        .await
        .expect("length query")
    {
        Some(existing) => existing,
        None => create_length(db, "Standard").await,
    };
    hairstyle::ActiveModel {
        name: Set(name.to_string()),
        image: Set(None),
        price: Set(price),
        is_active: Set(true),
        length_id: Set(length.id),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert hairstyle")
}

pub async fn create_facial_hair(db: &DatabaseConnection, name: &str, price: Decimal) -> facial_hair::Model {
    facial_hair::ActiveModel {
        name: Set(name.to_string()),
        image: Set(None),
        price: Set(price),
        is_active: Set(true),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert facial hair")
}

pub async fn create_dying(db: &DatabaseConnection, name: &str, hex_code: Option<&str>) -> dying::Model {
    dying::ActiveModel {
        name: Set(name.to_string()),
        hex_code: Set(hex_code.map(str::to_string)),
        is_active: Set(true),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert dye color")
}
