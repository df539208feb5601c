use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;

use crate::domain::entities::Company;
use crate::infrastructure::database::schema::companies;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = companies)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CompanyModel {
    pub id: i32,
    pub name: String,
    pub ticker: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub description: Option<String>,
    pub founded_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = companies)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewCompanyModel {
    pub name: String,
    pub ticker: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub description: Option<String>,
    pub founded_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl From<&Company> for NewCompanyModel {
    fn from(company: &Company) -> Self {
        Self {
            name: company.name().to_string(),
            ticker: company.ticker().map(str::to_string),
            sector: company.sector().map(str::to_string),
            industry: company.industry().map(str::to_string),
            description: company.description().map(str::to_string),
            founded_date: company.founded_date(),
            created_at: company.created_at(),
        }
    }
}

impl From<CompanyModel> for Company {
    fn from(model: CompanyModel) -> Self {
        Company::from_database(
            model.id,
            model.name,
            model.ticker,
            model.sector,
            model.industry,
            model.description,
            model.founded_date,
            model.created_at,
        )
    }
}
