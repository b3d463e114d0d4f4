use polars::prelude::{DataType, Field, Schema};

pub const AGE: &str = "age";
pub const SEX: &str = "sex";
pub const BMI: &str = "bmi";
pub const CHILDREN: &str = "children";
pub const SMOKER: &str = "smoker";
pub const REGION: &str = "region";
pub const CHARGES: &str = "charges";

/// Header names of the insurance file, in file order.
pub const COLUMNS: [&str; 7] = [AGE, SEX, BMI, CHILDREN, SMOKER, REGION, CHARGES];

pub const MALE: &str = "male";
pub const FEMALE: &str = "female";
pub const SMOKES: &str = "yes";

pub struct ClientRecord {}

impl ClientRecord {
    /// Schema of the typed column view.
    pub fn raw_schema() -> Schema {
        Schema::from_iter(vec![
            Field::new(AGE, DataType::Int64),
            Field::new(SEX, DataType::Utf8),
            Field::new(BMI, DataType::Float64),
            Field::new(CHILDREN, DataType::UInt32),
            Field::new(SMOKER, DataType::Utf8),
            Field::new(REGION, DataType::Utf8),
            Field::new(CHARGES, DataType::Float64),
        ])
    }
}
