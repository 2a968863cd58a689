//! NSI script template.
//!
//! Rendered with Handlebars. Paths that join a logical destination and a
//! name are precomputed, because `\{{` is an escaped mustache in Handlebars.

/// Installer definition for a bundled Python application.
pub const NSI_TEMPLATE: &str = r#"; Generated installer definition for {{app_name}} {{app_version}}

!define PRODUCT_NAME "{{app_name}}"
!define PRODUCT_VERSION "{{app_version}}"
!define PY_VERSION "{{py_version}}"
!define PY_MAJOR_VERSION "{{py_major_version}}"
!define BITNESS "{{py_bit}}"
!define ARCH_TAG "{{arch_tag}}"
!define INSTALLER_NAME "{{installer_name}}"
!define PUBLISHER "{{publisher}}"
!define UNINSTALL_KEY "Software\Microsoft\Windows\CurrentVersion\Uninstall\${PRODUCT_NAME}"

SetCompressor lzma
Unicode true
ManifestDPIAware true

!define MULTIUSER_EXECUTIONLEVEL Highest
!define MULTIUSER_INSTALLMODE_DEFAULT_CURRENTUSER
!define MULTIUSER_MUI
!define MULTIUSER_INSTALLMODE_COMMANDLINE
!define MULTIUSER_INSTALLMODE_INSTDIR "${PRODUCT_NAME}"
{{#if is_64bit}}
!define MULTIUSER_INSTALLMODE_FUNCTION correct_prog_files
{{/if}}
!include MultiUser.nsh
!include FileFunc.nsh
!include "MUI2.nsh"

!define MUI_ABORTWARNING
{{#if icon}}
!define MUI_ICON "{{icon}}"
!define MUI_UNICON "{{icon}}"
{{/if}}

!insertmacro MUI_PAGE_WELCOME
{{#if license_file}}
!insertmacro MUI_PAGE_LICENSE "{{license_file}}"
{{/if}}
!insertmacro MULTIUSER_PAGE_INSTALLMODE
!insertmacro MUI_PAGE_DIRECTORY
!insertmacro MUI_PAGE_INSTFILES
!insertmacro MUI_PAGE_FINISH

!insertmacro MUI_UNPAGE_CONFIRM
!insertmacro MUI_UNPAGE_INSTFILES

!insertmacro MUI_LANGUAGE "English"

Name "${PRODUCT_NAME} ${PRODUCT_VERSION}"
OutFile "${OUTPUT_FILE}"
ShowInstDetails show

VIProductVersion "{{version_nsis}}"
VIAddVersionKey "ProductName" "${PRODUCT_NAME}"
VIAddVersionKey "ProductVersion" "${PRODUCT_VERSION}"
VIAddVersionKey "FileVersion" "${PRODUCT_VERSION}"
VIAddVersionKey "CompanyName" "${PUBLISHER}"
VIAddVersionKey "FileDescription" "${PRODUCT_NAME} installer"

Section -SETTINGS
  SetOutPath "$INSTDIR"
  SetOverwrite ifnewer
SectionEnd

{{#if msvcrt_files}}
Section "-msvcrt" sec_msvcrt
  SetOutPath "$INSTDIR\Python"
{{#each msvcrt_files}}
  File "{{source}}"
{{/each}}
SectionEnd

{{/if}}
Section "!${PRODUCT_NAME}" sec_app
  SetRegView {{py_bit}}
  SectionIn RO
{{#each icon_files}}
  File "{{name}}"
{{/each}}

  SetOutPath "$INSTDIR\pkgs"
  File /r "pkgs\*.*"
  SetOutPath "$INSTDIR"

{{#each grouped_files}}
  SetOutPath "{{destination}}"
{{#each files}}
  File "{{this}}"
{{/each}}
{{/each}}
  SetOutPath "$INSTDIR"

{{#each install_dirs}}
  SetOutPath "{{install_path}}"
  File /r "{{source_glob}}"
{{/each}}
  SetOutPath "$INSTDIR"

{{#if shortcuts}}
{{#unless single_shortcut}}
  CreateDirectory "$SMPROGRAMS\${PRODUCT_NAME}"
{{/unless}}
{{/if}}
{{#each shortcuts}}
  CreateShortCut "{{lnk_path}}" "{{target}}" "{{parameters}}" "{{icon_path}}"
{{/each}}

{{#if has_commands}}
  DetailPrint "Adding commands to PATH"
  nsExec::ExecToLog '{{python}} -Es "$INSTDIR\_system_path.py" add "$INSTDIR\bin"'
  Pop $0
{{/if}}

  WriteUninstaller "$INSTDIR\uninstall.exe"
  WriteRegStr SHCTX "${UNINSTALL_KEY}" "DisplayName" "${PRODUCT_NAME}"
  WriteRegStr SHCTX "${UNINSTALL_KEY}" "UninstallString" '"$INSTDIR\uninstall.exe"'
  WriteRegStr SHCTX "${UNINSTALL_KEY}" "InstallLocation" "$INSTDIR"
{{#if icon}}
  WriteRegStr SHCTX "${UNINSTALL_KEY}" "DisplayIcon" "{{icon_install_path}}"
{{/if}}
  WriteRegStr SHCTX "${UNINSTALL_KEY}" "Publisher" "${PUBLISHER}"
  WriteRegStr SHCTX "${UNINSTALL_KEY}" "DisplayVersion" "${PRODUCT_VERSION}"
  WriteRegDWORD SHCTX "${UNINSTALL_KEY}" "NoModify" 1
  WriteRegDWORD SHCTX "${UNINSTALL_KEY}" "NoRepair" 1

  ${GetSize} "$INSTDIR" "/S=0K" $0 $1 $2
  IntFmt $0 "0x%08X" $0
  WriteRegDWORD SHCTX "${UNINSTALL_KEY}" "EstimatedSize" "$0"
SectionEnd

Section "Uninstall"
  SetRegView {{py_bit}}
{{#if has_commands}}
  nsExec::ExecToLog '{{python}} -Es "$INSTDIR\_system_path.py" remove "$INSTDIR\bin"'
  Pop $0
{{/if}}
  Delete "$INSTDIR\uninstall.exe"
{{#each icon_files}}
  Delete "{{install_path}}"
{{/each}}
  RMDir /r "$INSTDIR\pkgs"

{{#each install_files}}
  Delete "{{install_path}}"
{{/each}}
{{#each install_dirs}}
  RMDir /r "{{install_path}}"
{{/each}}
{{#each shortcuts}}
  Delete "{{lnk_path}}"
{{/each}}
{{#if shortcuts}}
{{#unless single_shortcut}}
  RMDir "$SMPROGRAMS\${PRODUCT_NAME}"
{{/unless}}
{{/if}}
  RMDir "$INSTDIR"
  DeleteRegKey SHCTX "${UNINSTALL_KEY}"
SectionEnd

Function .onInit
  !insertmacro MULTIUSER_INIT
FunctionEnd

Function un.onInit
  !insertmacro MULTIUSER_UNINIT
FunctionEnd
{{#if is_64bit}}

Function correct_prog_files
  StrCmp $MultiUser.InstallMode "AllUsers" 0 +2
  StrCpy $INSTDIR "$PROGRAMFILES64\${MULTIUSER_INSTALLMODE_INSTDIR}"
FunctionEnd
{{/if}}
"#;
