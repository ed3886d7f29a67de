use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

use crate::api::attendance::{AttendanceQuery, SummaryQuery};
use crate::api::employee::{CreateEmployee, EmployeeListResponse, EmployeeQuery};
use crate::api::land::{
    CreateStage, StageListResponse, StageQuery, UpdateStage, WorkflowTransition,
};
use crate::api::leave::{CreateLeave, LeaveFilter, LeaveListResponse};
use crate::api::leave_balance::BalanceSummary;
use crate::api::loan::{CreateLoan, LoanQuery};
use crate::api::payroll::{
    GenerateOutcome, GeneratePayrolls, MarkPaid, PaginatedPayrollResponse, PayrollQuery,
    UpdatePayroll,
};
use crate::api::training::{
    AssessmentOutcome, CreateCourse, CreateEnrollment, CreateProgram, CourseQuery,
    EnrollmentQuery, SubmitAssessment, SubmitRating, TopQuery, UpdateProgress,
};
use crate::calc::payroll::{AllowanceItem, Allowances, AttendanceMonth, AttendanceOutcome};
use crate::model::attendance::{Attendance, MonthlySummary};
use crate::model::department::Department;
use crate::model::employee::Employee;
use crate::model::job_title::JobTitle;
use crate::model::land::StageRow;
use crate::model::leave::{LeaveBalance, LeaveRequest, LeaveType};
use crate::model::loan::Loan;
use crate::model::payroll::{Payroll, PayrollStatus};
use crate::model::training::{Course, CourseCompletion, Enrollment, TrainingProgram};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
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
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HR Core API",
        version = "1.0.0",
        description = r#"
## HR / ERP backend

Employee, attendance, leave, payroll, training and land-acquisition tracking
for a single organization.

- **Employee Management** - profiles, salary structure and allowance slots
- **Attendance** - daily check-in/check-out and monthly summaries
- **Leave** - requests, approvals, anniversary-based balances with capped
  carry-forward
- **Payroll** - monthly generation (tax slabs, provident fund, EOBI,
  attendance proration) with a Draft/Approved/Paid lifecycle
- **Training** - course catalog, enrollments, assessments and completion rates
- **Land Acquisition** - six-stage workflow pipeline with transition history

Most endpoints are protected with **JWT Bearer authentication**; sensitive
operations require the Admin or HR role.

Built with **Actix Web**, **SQLx** and **Utoipa**.
"#,
    ),
    paths(
        crate::api::leave::leave_list,
        crate::api::leave::get_leave,
        crate::api::leave::create_leave,
        crate::api::leave::approve_leave,
        crate::api::leave::reject_leave,

        crate::api::leave_balance::get_balance,
        crate::api::leave_balance::balance_summary,
        crate::api::leave_balance::recalculate,

        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::monthly_summary,
        crate::api::attendance::list_attendance,

        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::list_employees,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,
        crate::api::employee::list_departments,
        crate::api::employee::list_job_titles,

        crate::api::payroll::generate_payrolls,
        crate::api::payroll::get_payroll,
        crate::api::payroll::list_payrolls,
        crate::api::payroll::update_payroll,
        crate::api::payroll::approve_payroll,
        crate::api::payroll::mark_payroll_paid,
        crate::api::payroll::cancel_payroll,
        crate::api::payroll::delete_payroll,

        crate::api::training::create_course,
        crate::api::training::list_courses,
        crate::api::training::top_courses,
        crate::api::training::create_enrollment,
        crate::api::training::list_enrollments,
        crate::api::training::update_progress,
        crate::api::training::submit_assessment,
        crate::api::training::submit_rating,
        crate::api::training::create_program,
        crate::api::training::list_programs,

        crate::api::loan::create_loan,
        crate::api::loan::list_loans,
    ),
    components(
        schemas(
            Employee, CreateEmployee, EmployeeQuery, EmployeeListResponse,
            Department, JobTitle,
            Attendance, MonthlySummary, SummaryQuery, AttendanceQuery,
            LeaveType, LeaveRequest, CreateLeave, LeaveFilter, LeaveListResponse,
            LeaveBalance, BalanceSummary,
            Payroll, PayrollStatus, GeneratePayrolls, GenerateOutcome, UpdatePayroll,
            MarkPaid, PayrollQuery, PaginatedPayrollResponse,
            AllowanceItem, Allowances, AttendanceMonth, AttendanceOutcome,
            Course, CourseCompletion, Enrollment, TrainingProgram,
            CreateCourse, CourseQuery, TopQuery, CreateEnrollment, EnrollmentQuery,
            UpdateProgress, SubmitAssessment, AssessmentOutcome, SubmitRating, CreateProgram,
            Loan, CreateLoan, LoanQuery,
            StageRow, CreateStage, UpdateStage, WorkflowTransition, StageQuery,
            StageListResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Employee", description = "Employee management APIs"),
        (name = "Attendance", description = "Attendance management APIs"),
        (name = "Leave", description = "Leave requests and work-year balances"),
        (name = "Payroll", description = "Payroll generation and lifecycle APIs"),
        (name = "Training", description = "Course catalog and enrollment APIs"),
        (name = "Loans", description = "Employee loan APIs"),
        (name = "Land", description = "Land-acquisition workflow pipeline"),
    )
)]
pub struct ApiDoc;
