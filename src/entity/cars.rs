use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cars")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub make_id: Uuid,
    pub color_id: Uuid,
    pub model: String,
    pub year: i32,
    pub price: i64,
    pub mileage: i64,
    pub fuel_type: String,
    pub transmission: String,
    pub body_type: String,
    pub seats: Option<i32>,
    pub description: Option<String>,
    pub status: String,
    pub featured: bool,
    #[sea_orm(column_type = "JsonBinary")]
    pub images: Json,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::car_makes::Entity",
        from = "Column::MakeId",
        to = "super::car_makes::Column::Id"
    )]
    CarMakes,
    #[sea_orm(
        belongs_to = "super::car_colors::Entity",
        from = "Column::ColorId",
        to = "super::car_colors::Column::Id"
    )]
    CarColors,
}

impl Related<super::car_makes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CarMakes.def()
    }
}

impl Related<super::car_colors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CarColors.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
