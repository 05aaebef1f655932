/*!
 * Data Structures
 *
 * Small value types shared by the process core:
 * - Bounded module names stored inline
 */

mod module_name;

pub use module_name::ModuleName;
